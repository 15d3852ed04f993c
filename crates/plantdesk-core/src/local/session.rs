//! Typed accessors over the fixed storage keys.

use std::sync::Arc;

use crate::result::AppResult;
use crate::traits::KeyValueStore;
use crate::types::SessionUser;

use super::keys;

/// Typed view of the client-local session state.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    /// Wrap a key/value store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored bearer token.
    pub fn token(&self) -> AppResult<Option<String>> {
        Ok(self.store.get(keys::TOKEN)?.filter(|t| !t.is_empty()))
    }

    /// Persist the bearer token.
    pub fn set_token(&self, token: &str) -> AppResult<()> {
        self.store.set(keys::TOKEN, token)
    }

    /// Stored session user.
    pub fn user(&self) -> AppResult<Option<SessionUser>> {
        match self.store.get(keys::USER)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persist the session user.
    pub fn set_user(&self, user: &SessionUser) -> AppResult<()> {
        self.store.set(keys::USER, &serde_json::to_string(user)?)
    }

    /// Remove token and user (logout). The sound preference is kept.
    pub fn clear_session(&self) -> AppResult<()> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USER)
    }

    /// Stored sound preference, or `default` when never set or unparsable.
    pub fn sound_enabled(&self, default: bool) -> bool {
        match self.store.get(keys::SOUND_ENABLED) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(default),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read sound preference, using default");
                default
            }
        }
    }

    /// Persist the sound preference.
    pub fn set_sound_enabled(&self, enabled: bool) -> AppResult<()> {
        self.store
            .set(keys::SOUND_ENABLED, if enabled { "true" } else { "false" })
    }
}
