//! Error types for the Lyceum CLI

use color_eyre::eyre::Report;
use thiserror::Error;

/// CLI error type with minimal variants
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file issues
    #[error("Configuration error: {0}")]
    Config(#[from] lyceum_common::ConfigurationError),

    /// API communication errors
    #[error("{0}")]
    Api(#[from] lyceum_sdk::ApiError),

    /// The command needs a signed-in session
    #[error("Not logged in. Run 'lyceum login' first")]
    NotLoggedIn,

    /// Bad command-line input
    #[error("{0}")]
    InvalidArgument(String),

    /// Interactive prompt failed (no TTY, interrupted)
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Output serialization
    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Everything else (using color-eyre's Report for rich errors)
    #[error(transparent)]
    Internal(#[from] Report),
}

impl CliError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(Report::msg(message.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
