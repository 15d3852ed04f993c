//! Sound alert preference CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use plantdesk_core::error::AppError;
use plantdesk_notify::sound::CommandAudioOutput;
use plantdesk_notify::sound::preference::SoundPreference;
use plantdesk_notify::SoundAlertEngine;

use crate::output;

/// Arguments for sound commands
#[derive(Debug, Args)]
pub struct SoundArgs {
    /// Sound subcommand
    #[command(subcommand)]
    pub command: SoundCommand,
}

/// Sound subcommands
#[derive(Debug, Subcommand)]
pub enum SoundCommand {
    /// Enable alert sounds
    On,
    /// Disable alert sounds
    Off,
    /// Flip the preference
    Toggle,
    /// Show the preference
    Status,
    /// Play the test cue
    Test,
}

/// Execute sound commands
pub async fn execute(args: &SoundArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let storage = super::open_storage(&config)?;
    let preference = Arc::new(SoundPreference::load(storage, config.sound.enabled_by_default));

    match &args.command {
        SoundCommand::On => {
            preference.set(true);
            output::print_success("Sound alerts enabled");
        }
        SoundCommand::Off => {
            preference.set(false);
            output::print_success("Sound alerts disabled");
        }
        SoundCommand::Toggle => {
            let enabled = preference.toggle();
            output::print_success(if enabled {
                "Sound alerts enabled"
            } else {
                "Sound alerts disabled"
            });
        }
        SoundCommand::Status => {
            output::print_kv("Sound", if preference.is_enabled() { "on" } else { "off" });
            output::print_kv(
                "Player",
                config.sound.player_command.as_deref().unwrap_or("terminal bell"),
            );
        }
        SoundCommand::Test => {
            let audio = Arc::new(CommandAudioOutput::new(config.sound.player_command.as_deref()));
            let engine = SoundAlertEngine::new(audio, preference.clone(), &config.sound);
            match engine.play_test().await {
                Some(layer) => output::print_success(&format!("Played test cue ({layer})")),
                None if !preference.is_enabled() => {
                    output::print_warning("Sound alerts are disabled; run `plantdesk sound on`")
                }
                None => output::print_warning("No audio layer could play the test cue"),
            }
        }
    }

    Ok(())
}
