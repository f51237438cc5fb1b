//! Auth session store.
//!
//! Holds the current user identity and bearer token for one browser session
//! and mirrors them into [`Storage`] so they survive a reload. The store
//! never validates the token itself; expiry is the backend's call.

pub mod storage;

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{Session, User};

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    key: String,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Load whatever was persisted under `key`. Unreadable data is dropped.
    pub fn hydrate(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match storage.get(&key) {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable persisted session");
                    if let Err(e) = storage.remove(&key) {
                        warn!(key = %key, error = %e, "Failed to clear persisted session");
                    }
                    None
                }
            },
            None => None,
        };

        Self {
            storage,
            key,
            current: RwLock::new(current),
        }
    }

    /// Store identity and token, persisting them before they become visible.
    pub fn login(&self, user: User, token: String) -> Result<(), StorageError> {
        let session = Session { user, token };
        self.storage.set(&self.key, serde_json::to_string(&session)?)?;
        info!(user = %session.user.email, role = %session.user.role, "Session started");
        *self.current.write() = Some(session);
        Ok(())
    }

    /// Clear identity and token from memory and storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        let previous = self.current.write().take();
        self.storage.remove(&self.key)?;
        if let Some(session) = previous {
            info!(user = %session.user.email, "Session ended");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}
