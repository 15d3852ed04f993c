//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file (or no
//! file at all) yields a working configuration.

pub mod api;
pub mod logging;
pub mod polling;
pub mod realtime;
pub mod sound;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::logging::LoggingConfig;
pub use self::polling::PollingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::sound::SoundConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Environment variable prefix for overrides (`PLANTDESK__API__BASE_URL=...`).
pub const ENV_PREFIX: &str = "PLANTDESK";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Realtime push transport settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Backstop polling intervals.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Sound alert settings.
    #[serde(default)]
    pub sound: SoundConfig,
    /// Client-local persisted storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables prefixed with `PLANTDESK__` override file values.
    /// A missing file is not an error; defaults apply.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_with_overlay(path, None)
    }

    /// Load configuration from a base file plus an optional overlay file.
    pub fn load_with_overlay(path: &str, overlay: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Some(overlay) = overlay {
            builder = builder.add_source(config::File::with_name(overlay).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings that would make the client misbehave at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.polling.list_interval_seconds == 0 || self.polling.count_interval_seconds == 0 {
            return Err(AppError::configuration(
                "Polling intervals must be greater than zero",
            ));
        }
        if self.realtime.reconnect_base_delay_ms == 0 {
            return Err(AppError::configuration(
                "realtime.reconnect_base_delay_ms must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.sound.ambient_volume)
            || !(0.0..=1.0).contains(&self.sound.test_volume)
        {
            return Err(AppError::configuration(
                "Sound volumes must be within 0.0..=1.0",
            ));
        }
        if self.sound.playback_timeout_ms == 0 {
            return Err(AppError::configuration(
                "sound.playback_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}
