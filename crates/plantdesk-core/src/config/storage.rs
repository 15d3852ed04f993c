//! Client-local persisted storage configuration.

use serde::{Deserialize, Serialize};

/// Where the client keeps its persisted key/value state (token, user, sound flag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the JSON storage file.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/local-storage.json".to_string()
}
