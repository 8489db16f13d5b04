use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::models::Profile;

/// Local-storage key holding the JSON-serialized session record.
pub const USER_KEY: &str = "battsUser";
/// Local-storage key holding the backend access token of the signed-in member.
pub const AUTH_TOKEN_KEY: &str = "sb-auth-token";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Storage(String),
    #[error("stored session record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// LocalStorage
///
/// A per-browser string key/value store, the server-side counterpart of `window.localStorage`.
/// In the running portal it is the member's cookie-bound `tower_sessions::Session`; tests use
/// [`MemoryStorage`].
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), SessionError>;
    async fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

#[async_trait]
impl LocalStorage for tower_sessions::Session {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.get::<String>(key)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.insert(key, value)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| SessionError::Storage(e.to_string()))
    }
}

/// In-memory [`LocalStorage`], one instance per simulated browser.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, bypassing the session record parsing.
    pub fn item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.item(key))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// SessionStore
///
/// Typed access to the session record kept in a [`LocalStorage`]. The record is a plain
/// copy of the member's profile row: no expiry, no version, so it can drift from the
/// server copy until the next login.
pub struct SessionStore<'a> {
    storage: &'a dyn LocalStorage,
}

impl<'a> SessionStore<'a> {
    pub fn new(storage: &'a dyn LocalStorage) -> Self {
        Self { storage }
    }

    pub async fn current_user(&self) -> Result<Option<Profile>, SessionError> {
        match self.storage.get_item(USER_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// A member counts as logged in as soon as a record is stored, parseable or not.
    pub async fn is_logged_in(&self) -> Result<bool, SessionError> {
        Ok(self.storage.get_item(USER_KEY).await?.is_some())
    }

    pub async fn save_user(&self, profile: &Profile) -> Result<(), SessionError> {
        let raw = serde_json::to_string(profile)?;
        self.storage.set_item(USER_KEY, raw).await
    }

    pub async fn access_token(&self) -> Result<Option<String>, SessionError> {
        self.storage.get_item(AUTH_TOKEN_KEY).await
    }

    pub async fn save_access_token(&self, token: Option<&str>) -> Result<(), SessionError> {
        match token {
            Some(token) => {
                self.storage
                    .set_item(AUTH_TOKEN_KEY, token.to_string())
                    .await
            }
            None => self.storage.remove_item(AUTH_TOKEN_KEY).await,
        }
    }

    /// Removes the record and the access token.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove_item(USER_KEY).await?;
        self.storage.remove_item(AUTH_TOKEN_KEY).await
    }
}
