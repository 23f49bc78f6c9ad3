//! Error types shared across Lyceum crates

use thiserror::Error;

/// Marker trait for Lyceum error types
pub trait LyceumError: std::error::Error + Send + Sync + 'static {}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A value is present but unusable
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// A required value is absent
    #[error("Missing required configuration value '{key}'")]
    MissingValue { key: String },

    /// The configuration source could not be parsed
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// The configuration file could not be read
    #[error("Failed to read configuration from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LyceumError for ConfigurationError {}

impl ConfigurationError {
    /// Shorthand for [`ConfigurationError::InvalidValue`]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
