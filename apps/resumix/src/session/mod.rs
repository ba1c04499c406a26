//! Session state — the access/refresh token pair and the signed-in user.
//!
//! All mutation goes through `set_session`, `set_access_token` and `clear_session`.
//! Readers always see the latest committed value.
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::errors::ClientError;
use crate::models::user::{Role, UserSummary};

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

pub const ACCESS_KEY: &str = "access";
pub const REFRESH_KEY: &str = "refresh";
pub const USER_KEY: &str = "user";

/// Point-in-time view of the persisted session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserSummary>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|u| u.role)
    }
}

/// Shared handle over the key–value store holding the session.
pub struct SessionStore {
    inner: Mutex<Box<dyn KeyValueStore>>,
}

impl SessionStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(store)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Session {
        let store = self.lock();
        Session {
            access_token: token(&**store, ACCESS_KEY),
            refresh_token: token(&**store, REFRESH_KEY),
            user: user(&**store),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        token(&**self.lock(), ACCESS_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        token(&**self.lock(), REFRESH_KEY)
    }

    pub fn user(&self) -> Option<UserSummary> {
        user(&**self.lock())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Replaces the whole session after login or registration.
    pub fn set_session(
        &self,
        access: &str,
        refresh: &str,
        user: &UserSummary,
    ) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(user)?;
        let mut store = self.lock();
        store.insert(ACCESS_KEY, access.to_string());
        store.insert(REFRESH_KEY, refresh.to_string());
        store.insert(USER_KEY, user_json);
        store.flush()?;
        info!(user_id = user.id, role = ?user.role, "Session established");
        Ok(())
    }

    /// Swaps in a refreshed access token, leaving the refresh token and user untouched.
    /// Returns false, changing nothing, when the session was cleared while the refresh
    /// was in flight. Flushing is a blocking write made while the lock is held.
    pub fn set_access_token(&self, access: &str) -> Result<bool, ClientError> {
        let mut store = self.lock();
        if token(&**store, REFRESH_KEY).is_none() {
            debug!("No refresh token stored, dropping new access token");
            return Ok(false);
        }
        store.insert(ACCESS_KEY, access.to_string());
        store.flush()?;
        debug!("Access token replaced");
        Ok(true)
    }

    /// Removes all three session keys together.
    pub fn clear_session(&self) -> Result<(), ClientError> {
        let mut store = self.lock();
        store.remove(ACCESS_KEY);
        store.remove(REFRESH_KEY);
        store.remove(USER_KEY);
        store.flush()?;
        info!("Session cleared");
        Ok(())
    }
}

/// Empty strings count as absent.
fn token(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store.get(key).filter(|t| !t.is_empty())
}

/// An unparseable user record counts as absent.
fn user(store: &dyn KeyValueStore) -> Option<UserSummary> {
    store
        .get(USER_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok())
}
