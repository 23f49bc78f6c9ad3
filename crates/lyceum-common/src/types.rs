//! Validated login primitives used across Lyceum components

use crate::defaults::MIN_PASSWORD_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted length of a phone number, separators included
const MAX_PHONE_LEN: usize = 32;

/// Error type for phone number validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number is required")]
    Empty,
    #[error("Phone number too long (max {} characters)", MAX_PHONE_LEN)]
    TooLong,
    #[error("Phone number contains invalid characters. Only digits, '+', spaces, '-' and parentheses are allowed")]
    InvalidCharacters,
}

/// A validated phone number used as the login identifier
///
/// Phone numbers must:
/// - Contain at least one digit after trimming surrounding whitespace
/// - Be at most 32 characters long
/// - Only contain digits, a leading `+`, spaces, hyphens and parentheses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new validated phone number
    pub fn new(phone: impl Into<String>) -> Result<Self, PhoneNumberError> {
        let phone = phone.into();
        let trimmed = phone.trim();
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    fn validate(phone: &str) -> Result<(), PhoneNumberError> {
        if phone.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if phone.len() > MAX_PHONE_LEN {
            return Err(PhoneNumberError::TooLong);
        }

        let body = phone.strip_prefix('+').unwrap_or(phone);
        if !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
        {
            return Err(PhoneNumberError::InvalidCharacters);
        }

        if !body.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::Empty);
        }

        Ok(())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error type for password validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is required")]
    Empty,
    #[error("Password must be at least {} characters long", MIN_PASSWORD_LEN)]
    TooShort,
}

/// A password that passed the client-side length rules
///
/// The value is never printed: `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Password(String);

impl Password {
    /// Create a new validated password
    pub fn new(password: impl Into<String>) -> Result<Self, PasswordError> {
        let password = password.into();
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasswordError::TooShort);
        }
        Ok(Self(password))
    }

    /// Expose the secret for transmission
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl TryFrom<String> for Password {
    type Error = PasswordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_valid() {
        assert!(PhoneNumber::new("+998900001122").is_ok());
        assert!(PhoneNumber::new("998 90 000 11 22").is_ok());
        assert!(PhoneNumber::new("+1 (555) 010-9999").is_ok());

        let trimmed = PhoneNumber::new("  +998900001122 ").unwrap();
        assert_eq!(trimmed.as_str(), "+998900001122");
    }

    #[test]
    fn test_phone_number_invalid() {
        assert_eq!(PhoneNumber::new(""), Err(PhoneNumberError::Empty));
        assert_eq!(PhoneNumber::new("   "), Err(PhoneNumberError::Empty));
        assert_eq!(PhoneNumber::new("+"), Err(PhoneNumberError::Empty));
        assert_eq!(
            PhoneNumber::new("9".repeat(33)),
            Err(PhoneNumberError::TooLong)
        );
        assert_eq!(
            PhoneNumber::new("+99890abc"),
            Err(PhoneNumberError::InvalidCharacters)
        );
        assert_eq!(
            PhoneNumber::new("99++890"),
            Err(PhoneNumberError::InvalidCharacters)
        );
    }

    #[test]
    fn test_phone_number_serde() {
        let phone: PhoneNumber = serde_json::from_str("\"+998900001122\"").unwrap();
        assert_eq!(phone.to_string(), "+998900001122");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+998900001122\"");

        let result: Result<PhoneNumber, _> = serde_json::from_str("\"call me\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(Password::new(""), Err(PasswordError::Empty));
        assert_eq!(Password::new("short"), Err(PasswordError::TooShort));
        assert!(Password::new("Admin@12345").is_ok());
    }

    #[test]
    fn test_password_is_redacted() {
        let password = Password::new("Admin@12345").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***)");
        assert_eq!(password.to_string(), "***");
        assert_eq!(password.expose(), "Admin@12345");
        assert_eq!(serde_json::to_string(&password).unwrap(), "\"Admin@12345\"");
    }
}
