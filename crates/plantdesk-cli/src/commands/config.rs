//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use plantdesk_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv("API", &config.api.base_url);
                output::print_kv(
                    "Realtime",
                    &if config.realtime.enabled {
                        format!("{} ({})", config.realtime.resolved_host(), mask_key(&config.realtime.app_key))
                    } else {
                        "disabled".to_string()
                    },
                );
                output::print_kv(
                    "Polling",
                    &format!(
                        "list {}s, count {}s",
                        config.polling.list_interval_seconds, config.polling.count_interval_seconds
                    ),
                );
                output::print_kv("Storage", &config.storage.path);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

/// Show only the first characters of the app key
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "no app key".to_string();
    }
    let visible: String = key.chars().take(4).collect();
    format!("{visible}…")
}
