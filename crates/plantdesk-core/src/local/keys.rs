//! Fixed storage keys.

/// Bearer token for the REST backend.
pub const TOKEN: &str = "token";

/// Serialized [`crate::types::SessionUser`].
pub const USER: &str = "user";

/// Sound alert preference (`"true"` / `"false"`).
pub const SOUND_ENABLED: &str = "notificationSoundEnabled";
