//! CLI command definitions and dispatch.

pub mod config;
pub mod notifications;
pub mod session;
pub mod sound;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use plantdesk_core::config::AppConfig;
use plantdesk_core::error::AppError;
use plantdesk_core::local::{FileStore, SessionStorage};
use plantdesk_notify::HttpNotificationApi;

use crate::output::OutputFormat;

/// PlantDesk notifications from the command line
#[derive(Debug, Parser)]
#[command(name = "plantdesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in or out of the backend
    Session(session::SessionArgs),
    /// List notifications
    List(notifications::ListArgs),
    /// Show the unread count
    Count,
    /// Mark one notification as read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification as read
    ReadAll {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Sound alert preference
    Sound(sound::SoundArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Session(args) => session::execute(args, &self.config, self.format).await,
            Commands::List(args) => notifications::list(args, &self.config, self.format).await,
            Commands::Count => notifications::count(&self.config, self.format).await,
            Commands::Read { id } => notifications::read(id, &self.config).await,
            Commands::ReadAll { force } => notifications::read_all(*force, &self.config).await,
            Commands::Sound(args) => sound::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    tracing::debug!(path = config_path, "Loading configuration");
    AppConfig::load(config_path)
}

/// Helper: open the local storage file named in the configuration
pub fn open_storage(config: &AppConfig) -> Result<SessionStorage, AppError> {
    let store = FileStore::open(&config.storage.path)?;
    Ok(SessionStorage::new(Arc::new(store)))
}

/// Helper: notification API client using the stored session token
pub fn api_client(config: &AppConfig, storage: SessionStorage) -> Result<HttpNotificationApi, AppError> {
    HttpNotificationApi::new(&config.api, storage)
}
