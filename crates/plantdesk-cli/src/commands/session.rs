//! Session login/logout CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use plantdesk_core::error::AppError;
use plantdesk_core::types::SessionUser;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Store a bearer token and the signed-in user
    Login {
        /// User ID as known to the backend
        #[arg(long)]
        user_id: String,
        /// Role name, e.g. "Production Manager"
        #[arg(long)]
        role: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Bearer token (prompted when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the stored token and user
    Logout,
    /// Show the stored session
    Show,
}

/// Stored session summary
#[derive(Debug, Serialize)]
struct SessionSummary {
    user: Option<SessionUser>,
    has_token: bool,
    sound_enabled: bool,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let storage = super::open_storage(&config)?;

    match &args.command {
        SessionCommand::Login {
            user_id,
            role,
            name,
            token,
        } => {
            let token = match token {
                Some(token) => token.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Bearer token")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
            };
            if token.trim().is_empty() {
                return Err(AppError::authentication("Token must not be empty"));
            }

            let user = SessionUser {
                name: name.clone(),
                ..SessionUser::new(user_id.as_str(), role.as_str())
            };
            storage.set_token(token.trim())?;
            storage.set_user(&user)?;
            output::print_success(&format!("Signed in as {} ({})", user.id, user.role));
        }
        SessionCommand::Logout => {
            storage.clear_session()?;
            output::print_success("Signed out");
        }
        SessionCommand::Show => {
            let summary = SessionSummary {
                user: storage.user()?,
                has_token: storage.token()?.is_some(),
                sound_enabled: storage.sound_enabled(config.sound.enabled_by_default),
            };
            match format {
                OutputFormat::Json => output::print_item(&summary, format),
                OutputFormat::Table => match &summary.user {
                    Some(user) => {
                        output::print_kv("User", user.id.as_str());
                        output::print_kv("Role", &user.role);
                        output::print_kv("Name", user.name.as_deref().unwrap_or("-"));
                        output::print_kv("Token", if summary.has_token { "stored" } else { "missing" });
                        output::print_kv("Sound", if summary.sound_enabled { "on" } else { "off" });
                    }
                    None => output::print_warning("Not signed in"),
                },
            }
        }
    }

    Ok(())
}
