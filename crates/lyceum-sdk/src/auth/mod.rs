//! Authentication module for the Lyceum SDK
//!
//! - Credential store with write-through session persistence
//! - Credential-free refresh transport
//! - Refresh coordinator queueing concurrent 401s behind a single refresh
//! - Session lifecycle events

pub mod coordinator;
pub mod credential_store;
pub mod events;
pub mod refresh;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use coordinator::{RefreshCoordinator, RefreshState};
pub use credential_store::CredentialStore;
pub use events::{SessionEvent, SessionEvents};
pub use refresh::{HttpRefreshTransport, RefreshTransport};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError};
pub use types::{AuthError, AuthResult, RefreshedTokens, Role, Session, User};
