//! # Lyceum CLI
//!
//! Command-line client for the Lyceum course-management CRM.
//!
//! The CLI signs in once, keeps the session in the user's data directory and
//! lets the SDK refresh the access token transparently on later runs:
//! - Session commands (login, logout, whoami, change-password)
//! - Read-only listings for people, groups, rooms and enrollments
//! - Finance reports (balance, debtors, overview)

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;

pub use cli::*;
pub use error::*;
