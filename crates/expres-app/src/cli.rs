//! CLI argument definitions for the `expres` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use expres_core::config::ApiConfig;
use expres_core::types::UserId;

/// Expres - report a vehicle incident in three steps from the command line.
#[derive(Parser, Debug)]
#[command(name = "expres", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the wizard with the given inputs and submit the incident.
    Submit(SubmitArgs),
    /// Print the effective configuration.
    ShowConfig,
}

/// Inputs for each wizard step. Files stand in for the camera, gallery and
/// microphone.
#[derive(Args, Debug, Default)]
pub struct SubmitArgs {
    /// Identity of the reporting user.
    #[arg(short = 'u', long = "user-id")]
    pub user_id: Option<i64>,

    /// Licence plate number (documentation step).
    #[arg(long = "plate", conflicts_with = "document")]
    pub plate: Option<String>,

    /// Photo of the vehicle documentation (documentation step).
    #[arg(long = "document")]
    pub document: Option<PathBuf>,

    /// Recorded voice note (audio step).
    #[arg(long = "audio")]
    pub audio: Option<PathBuf>,

    /// Optional photo or video of the scene (media step).
    #[arg(long = "media")]
    pub media: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    /// Session token for the backend.
    #[arg(long = "token")]
    pub token: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > EXPRES_CONFIG env var > ~/.expres/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("EXPRES_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

impl SubmitArgs {
    /// Resolve the reporting user.
    ///
    /// Priority: --user-id flag > EXPRES_USER_ID env var. `None` when neither
    /// yields a number.
    pub fn resolve_user_id(&self) -> Option<UserId> {
        if let Some(id) = self.user_id {
            return Some(UserId(id));
        }
        std::env::var("EXPRES_USER_ID")
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(UserId)
    }

    /// Apply --api-url and --token on top of the configured API section.
    pub fn apply_api_overrides(&self, api: &mut ApiConfig) {
        if let Some(ref url) = self.api_url {
            api.base_url = url.clone();
        }
        if let Some(ref token) = self.token {
            api.bearer_token = Some(token.clone());
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".expres").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".expres").join("config.toml");
    }
    PathBuf::from("config.toml")
}
