//! Authentication-related types and data structures

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Role of the signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "teacher")]
    Teacher,
    #[serde(alias = "manager")]
    Manager,
    #[serde(alias = "user")]
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Manager => "MANAGER",
            Role::User => "USER",
        };
        f.write_str(name)
    }
}

/// Identity returned by the login endpoint and persisted with the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    /// Some backends send the phone as a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<bool>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password.unwrap_or(false)
    }
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Missing(()) => String::new(),
    })
}

/// Persisted session: `{ token, refreshToken, user }`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            refresh_token,
            user,
        }
    }
}

// Tokens stay out of logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone: lyceum_common::PhoneNumber,
    pub password: lyceum_common::Password,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Response of the refresh endpoint
///
/// `access_token` is optional so that a 2xx without a token can be told apart
/// from a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of `POST /auth/change-password`
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: lyceum_common::Password,
}

/// Generic `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The refresh endpoint answered with a non-success status
    #[error("Refresh rejected with status {status}: {message}")]
    RefreshRejected { status: u16, message: String },

    /// The refresh endpoint answered 2xx without an access token
    #[error("Refresh response did not contain an access token")]
    MissingAccessToken,

    /// Network error during refresh
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Refresh call exceeded the transport timeout
    #[error("Refresh request timed out")]
    Timeout,

    /// Invalid refresh response body
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),
}
