//! Error types for the Lyceum SDK

use crate::auth::storage::SessionStorageError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Lyceum client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure, no response was received
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Transport timeout
    #[error("Request timeout")]
    Timeout,

    /// The refresh call failed; the session has been cleared
    #[error("Session expired: {message}")]
    AuthExpired { message: String },

    /// A request replayed with a fresh token was rejected again
    #[error("Request rejected after token refresh: {message}")]
    RetryExhausted { message: String },

    /// Login was refused by the backend
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// 401 on a request the refresh protocol does not cover
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// 403
    #[error("Authorization error: {message}")]
    Authorization { message: String },

    /// 404
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// 400 and 422
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// 409
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// 429
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// 503
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    /// Any other non-success status
    #[error("Request failed with status {status}: {message}")]
    Server { status: u16, message: String },

    /// Invalid input detected before anything was sent
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Session persistence failure
    #[error("Session storage error: {0}")]
    Storage(#[from] SessionStorageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl lyceum_common::LyceumError for ApiError {}

impl ApiError {
    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::HttpClient(_) => "LYCEUM_HTTP_CLIENT_ERROR",
            ApiError::Timeout => "LYCEUM_TIMEOUT",
            ApiError::AuthExpired { .. } => "LYCEUM_AUTH_EXPIRED",
            ApiError::RetryExhausted { .. } => "LYCEUM_AUTH_RETRY_EXHAUSTED",
            ApiError::InvalidCredentials { .. } => "LYCEUM_INVALID_CREDENTIALS",
            ApiError::Authentication { .. } => "LYCEUM_AUTH_ERROR",
            ApiError::Authorization { .. } => "LYCEUM_AUTHZ_ERROR",
            ApiError::NotFound { .. } => "LYCEUM_NOT_FOUND",
            ApiError::BadRequest { .. } => "LYCEUM_BAD_REQUEST",
            ApiError::Conflict { .. } => "LYCEUM_CONFLICT",
            ApiError::RateLimitExceeded => "LYCEUM_RATE_LIMIT",
            ApiError::ServiceUnavailable => "LYCEUM_SERVICE_UNAVAILABLE",
            ApiError::Server { .. } => "LYCEUM_SERVER_ERROR",
            ApiError::InvalidRequest { .. } => "LYCEUM_INVALID_REQUEST",
            ApiError::Storage(_) => "LYCEUM_STORAGE_ERROR",
            ApiError::Serialization(_) => "LYCEUM_SERIALIZATION_ERROR",
            ApiError::Internal { .. } => "LYCEUM_INTERNAL_ERROR",
        }
    }

    /// Check if error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::HttpClient(_) | ApiError::Timeout | ApiError::ServiceUnavailable => true,
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if error is a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidCredentials { .. }
                | ApiError::Authentication { .. }
                | ApiError::Authorization { .. }
                | ApiError::NotFound { .. }
                | ApiError::BadRequest { .. }
                | ApiError::Conflict { .. }
                | ApiError::RateLimitExceeded
                | ApiError::InvalidRequest { .. }
        )
    }

    /// Whether the caller has to sign in again
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            ApiError::AuthExpired { .. } | ApiError::RetryExhausted { .. }
        )
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<StatusCode> {
        let code = match self {
            ApiError::InvalidCredentials { .. }
            | ApiError::Authentication { .. }
            | ApiError::RetryExhausted { .. } => 401,
            ApiError::Authorization { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::RateLimitExceeded => 429,
            ApiError::ServiceUnavailable => 503,
            ApiError::Server { status, .. } => *status,
            ApiError::HttpClient(err) => return err.status(),
            _ => return None,
        };
        StatusCode::from_u16(code).ok()
    }

    /// Map a non-success response onto the error taxonomy
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = ErrorResponse::message_from(status, body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Authentication { message },
            StatusCode::FORBIDDEN => ApiError::Authorization { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { resource: message },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::BadRequest { message }
            }
            StatusCode::CONFLICT => ApiError::Conflict { message },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimitExceeded,
            StatusCode::SERVICE_UNAVAILABLE => ApiError::ServiceUnavailable,
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Error body returned by the backend
///
/// `message` is either a single string or a list of validation messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<ErrorMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Single or multiple error messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn join(&self) -> String {
        match self {
            ErrorMessage::Single(message) => message.clone(),
            ErrorMessage::Many(messages) => messages.join(", "),
        }
    }
}

impl ErrorResponse {
    /// Best-effort human readable message for a failed response
    pub fn message_from(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            if let Some(message) = parsed.message.as_ref().map(ErrorMessage::join) {
                if !message.is_empty() {
                    return message;
                }
            }
            if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
                return error;
            }
        } else if let Ok(messages) = serde_json::from_str::<Vec<String>>(body) {
            if !messages.is_empty() {
                return messages.join(", ");
            }
        }

        let trimmed = body.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }

        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("status {}", status.as_u16()))
    }
}
