//! Key/value backends that keep the session across restarts

use etcetera::{choose_base_strategy, BaseStrategy};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a session storage backend
#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to determine data directory: {0}")]
    DataDir(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Minimal get/set/remove contract, shaped after browser session storage
///
/// Values are opaque strings; the credential store owns the encoding.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError>;
    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError>;
}

/// Process-local storage, lost when the client is dropped
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory
///
/// Writes go through a temporary file and a rename so a crash never leaves a
/// half-written session behind.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform data directory (e.g. `~/.local/share/lyceum`)
    pub fn in_default_dir() -> Result<Self, SessionStorageError> {
        Ok(Self::new(default_data_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SessionStorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(SessionStorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SessionStorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| SessionStorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, value).map_err(|source| SessionStorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| SessionStorageError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Persisted session to {}", path.display());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed session file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStorageError::Io { path, source }),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    std::fs::write(path, value)
}

/// Platform data directory for Lyceum (e.g. `~/.local/share/lyceum` on Linux)
pub fn default_data_dir() -> Result<PathBuf, SessionStorageError> {
    let strategy =
        choose_base_strategy().map_err(|e| SessionStorageError::DataDir(e.to_string()))?;
    Ok(strategy.data_dir().join("lyceum"))
}
