//! CLI-specific client creation
//!
//! Builds a [`LyceumClient`] whose session lives in a file under the configured
//! session directory, so a login survives between invocations and the SDK can
//! refresh the access token on its own.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::print_warning;
use lyceum_sdk::{FileSessionStorage, LyceumClient};
use std::sync::Arc;
use tracing::debug;

/// Create a client backed by the on-disk session
pub fn create_client(config: &CliConfig) -> Result<LyceumClient> {
    let session_dir = config.session_dir()?;
    debug!("Using session directory: {}", session_dir.display());

    let client = LyceumClient::builder()
        .base_url(config.api.base_url.clone())
        .timeout(config.timeout())
        .refresh_path(config.api.refresh_path.clone())
        .session_storage(Arc::new(FileSessionStorage::new(session_dir)))
        .on_session_expired(|reason| {
            print_warning(&format!(
                "Session expired ({reason}). Run 'lyceum login' to sign in again"
            ));
        })
        .build()?;

    Ok(client)
}

/// Create a client and require a stored session
pub fn create_authenticated_client(config: &CliConfig) -> Result<LyceumClient> {
    let client = create_client(config)?;
    if !client.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    Ok(client)
}
