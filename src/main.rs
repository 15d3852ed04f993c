//! PlantDesk notifier
//!
//! Headless entry point that wires the notification pipeline together for
//! the signed-in user stored by `plantdesk session login` and runs it until
//! interrupted.

use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{EnvFilter, fmt};

use plantdesk_core::config::AppConfig;
use plantdesk_core::error::AppError;
use plantdesk_core::local::{FileStore, SessionStorage};
use plantdesk_notify::session::SessionOptions;
use plantdesk_notify::sound::CommandAudioOutput;
use plantdesk_notify::sound::preference::SoundPreference;
use plantdesk_notify::view::BellView;
use plantdesk_notify::view::bell::DEFAULT_RECENT_LIMIT;
use plantdesk_notify::{
    HttpNotificationApi, NotificationSession, NotificationStore, SoundAlertEngine,
    TracingToastSink,
};
use plantdesk_realtime::{ChannelManager, PusherTransport};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Notifier error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, an optional environment overlay, and env vars
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PLANTDESK_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("PLANTDESK_ENV").unwrap_or_else(|_| "development".to_string());
    let overlay = format!("config/{}.toml", env);

    AppConfig::load_with_overlay(&config_path, Some(&overlay))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(mut config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PlantDesk notifier v{}", env!("CARGO_PKG_VERSION"));

    // ── Local storage and session ────────────────────────────────
    let storage = SessionStorage::new(Arc::new(FileStore::open(&config.storage.path)?));
    let user = storage.user()?.ok_or_else(|| {
        AppError::authentication("No signed-in user; run `plantdesk session login` first")
    })?;
    if storage.token()?.is_none() {
        return Err(AppError::authentication(
            "No session token; run `plantdesk session login` first",
        ));
    }

    if config.realtime.enabled && config.realtime.app_key.trim().is_empty() {
        tracing::warn!("realtime.app_key is empty, falling back to polling only");
        config.realtime.enabled = false;
    }

    // ── Notification pipeline ────────────────────────────────────
    let api = Arc::new(HttpNotificationApi::new(&config.api, storage.clone())?);
    let preference = Arc::new(SoundPreference::load(
        storage.clone(),
        config.sound.enabled_by_default,
    ));
    let audio = Arc::new(CommandAudioOutput::new(config.sound.player_command.as_deref()));
    if !audio.has_player() {
        tracing::info!("No audio player configured, alerts use the terminal bell");
    }
    let sound = Arc::new(SoundAlertEngine::new(audio, preference, &config.sound));
    let store = Arc::new(NotificationStore::new(
        api,
        sound,
        Arc::new(TracingToastSink),
    ));

    let transport = Arc::new(PusherTransport::new(config.realtime.clone()));
    let manager = Arc::new(ChannelManager::new(transport, config.realtime.clone()));

    let session = NotificationSession::start(
        user,
        Arc::clone(&store),
        Arc::clone(&manager),
        SessionOptions::from_config(&config),
    )
    .await;

    // ── Run until interrupted ────────────────────────────────────
    let mut changes = store.subscribe();
    let mut last_badge = None;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = changes.borrow_and_update().clone();
                let view = BellView::build(
                    &state,
                    manager.connection_state(),
                    Utc::now(),
                    DEFAULT_RECENT_LIMIT,
                );
                if view.badge != last_badge {
                    tracing::info!(
                        badge = view.badge.as_deref().unwrap_or("-"),
                        connectivity = ?view.connectivity,
                        "Bell updated"
                    );
                    last_badge = view.badge.clone();
                }
                if let Ok(json) = serde_json::to_string(&view) {
                    tracing::debug!(view = %json, "Bell view");
                }
            }
        }
    }

    tracing::info!("Shutdown signal received, stopping notification session...");
    session.shutdown().await;
    tracing::info!("PlantDesk notifier stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
