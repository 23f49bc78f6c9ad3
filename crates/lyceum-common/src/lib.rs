//! # Lyceum Common
//!
//! Shared building blocks for the Lyceum CRM client crates:
//! - Compiled-in defaults for the backend endpoints
//! - Unified `tracing` initialisation for binaries
//! - Validated login primitives
//! - Configuration error type

pub mod defaults;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{ConfigurationError, LyceumError};
pub use types::{Password, PasswordError, PhoneNumber, PhoneNumberError};
