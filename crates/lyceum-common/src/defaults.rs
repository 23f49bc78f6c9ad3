//! Default endpoints and limits for the Lyceum backend
//!
//! These constants are compiled into the binaries so a fresh install can talk
//! to a local backend without a configuration file.

/// Base URL of the CRM backend when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Transport-level timeout applied to every request, refresh included
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoint exchanging a refresh token (or refresh cookie) for a new access token
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Endpoint exchanging phone and password for a credential pair
pub const LOGIN_PATH: &str = "/auth/login";

/// Endpoint changing the password of the signed-in user
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Key under which the session is persisted
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Page size used by list views when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
