//! Authenticated session user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque backend user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user a notification session runs for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User identifier (`_id` accepted as alias).
    #[serde(alias = "_id")]
    pub id: UserId,
    /// Display role, e.g. `"Sales"`, `"Unit Head"`, `"Super User"`.
    pub role: String,
    /// Display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionUser {
    /// Create a session user.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            role: role.into(),
            name: None,
        }
    }
}
