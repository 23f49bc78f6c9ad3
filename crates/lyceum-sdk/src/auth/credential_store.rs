//! Credential store: the single owner of the current session
//!
//! Reads are synchronous and never suspend. Every mutation updates memory first
//! and then writes through to the [`SessionStorage`] backend while still holding
//! the write lock, so a persistence failure never leaves the in-memory view
//! behind the server's and a concurrent `clear` cannot be overwritten by a late
//! write.
//!
//! Each login (`set`) and logout (`clear`) starts a new session generation. A
//! refresh started under one generation can only install its token into the
//! same generation.

use super::storage::{MemorySessionStorage, SessionStorage, SessionStorageError};
use super::types::{Session, User};
use lyceum_common::defaults::SESSION_STORAGE_KEY;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CredentialStore {
    session: RwLock<Option<Session>>,
    /// Bumped under the write lock by `set` and `clear`
    generation: AtomicU64,
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .field("authenticated", &self.session.read().is_some())
            .finish()
    }
}

impl CredentialStore {
    /// Empty store writing to `storage` under the default key
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_key(storage, SESSION_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
            storage,
            key: key.into(),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::new()))
    }

    /// Load a previously persisted session
    ///
    /// A corrupt entry is discarded rather than failing startup.
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Result<Self, SessionStorageError> {
        let store = Self::new(storage);
        if let Some(raw) = store.storage.get_item(&store.key)? {
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    debug!("Restored persisted session");
                    *store.session.write() = Some(session);
                }
                Err(e) => {
                    warn!("Discarding unreadable persisted session: {}", e);
                    store.storage.remove_item(&store.key)?;
                }
            }
        }
        Ok(store)
    }

    /// Replace the whole session (login)
    pub fn set(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        user: Option<User>,
    ) -> Result<(), SessionStorageError> {
        let session = Session::new(access_token, refresh_token, user);
        let mut guard = self.session.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *guard = Some(session);
        self.persist(guard.as_ref())
    }

    /// Install a refreshed access token
    ///
    /// A rotated refresh token replaces the stored one; `None` keeps the
    /// existing one. The cached user is left untouched.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Result<(), SessionStorageError> {
        let mut guard = self.session.write();
        self.install_token(&mut guard, access_token.into(), refresh_token)
    }

    /// Install a refreshed access token only if no login or logout happened
    /// since `generation` was read
    ///
    /// Returns `Ok(false)` and leaves the store untouched otherwise.
    pub fn update_access_token_at(
        &self,
        generation: u64,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Result<bool, SessionStorageError> {
        let mut guard = self.session.write();
        if self.generation.load(Ordering::Acquire) != generation {
            return Ok(false);
        }
        self.install_token(&mut guard, access_token.into(), refresh_token)?;
        Ok(true)
    }

    fn install_token(
        &self,
        slot: &mut Option<Session>,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<(), SessionStorageError> {
        match slot.as_mut() {
            Some(session) => {
                session.token = access_token;
                if refresh_token.is_some() {
                    session.refresh_token = refresh_token;
                }
            }
            None => {
                // cookie-based refresh can succeed without a prior session
                *slot = Some(Session::new(access_token, refresh_token, None));
            }
        }
        self.persist(slot.as_ref())
    }

    /// Forget both tokens and the cached user
    pub fn clear(&self) -> Result<(), SessionStorageError> {
        let mut guard = self.session.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        *guard = None;
        self.persist(None)
    }

    /// Clear the session only if it is still the one from `generation`
    pub fn clear_at(&self, generation: u64) -> Result<bool, SessionStorageError> {
        let mut guard = self.session.write();
        if self.generation.load(Ordering::Acquire) != generation {
            return Ok(false);
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        *guard = None;
        self.persist(None)?;
        Ok(true)
    }

    /// Current session generation, see [`CredentialStore::update_access_token_at`]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Current access token
    pub fn get(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.session.read().as_ref().and_then(|s| s.user.clone())
    }

    /// Apply `f` to the cached user and persist the result
    ///
    /// Returns `false` when no user is cached.
    pub fn update_user<F>(&self, f: F) -> Result<bool, SessionStorageError>
    where
        F: FnOnce(&mut User),
    {
        let mut guard = self.session.write();
        match guard.as_mut().and_then(|s| s.user.as_mut()) {
            Some(user) => f(user),
            None => return Ok(false),
        }
        self.persist(guard.as_ref())?;
        Ok(true)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.session.read().clone()
    }

    fn persist(&self, session: Option<&Session>) -> Result<(), SessionStorageError> {
        match session {
            Some(session) => {
                let raw = serde_json::to_string(session)?;
                self.storage.set_item(&self.key, &raw)
            }
            None => self.storage.remove_item(&self.key),
        }
    }
}
