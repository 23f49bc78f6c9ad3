//! # Lyceum SDK
//!
//! Authenticated client for the Lyceum course-management CRM:
//! - Bearer credential attached to every request
//! - Single-flight token refresh on 401 with FIFO replay of queued requests
//! - Session persistence behind a pluggable storage backend
//! - Typed wrappers for students, teachers, managers, groups, rooms,
//!   enrollments and finance

pub mod auth;
pub mod client;
pub mod error;
pub mod resources;
pub mod transport;
pub mod types;

pub use auth::{
    CredentialStore, FileSessionStorage, MemorySessionStorage, RefreshState, RefreshTransport,
    Role, SessionEvent, SessionStorage, User,
};
pub use client::{ClientBuilder, LyceumClient};
pub use error::{ApiError, Result};
pub use resources::{overview_window, OverviewWindow};
pub use transport::{attach_credential, ApiRequest, ApiResponse, Transport};
pub use types::*;
