use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use imagegen_engine::{ClientSettings, SaveSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use imagegen_logging::{LogDestination, LogSettings};
use log::LevelFilter;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("missing API key: set OPENAI_API_KEY or pass --api-key")]
pub struct MissingApiKey;

/// Generate images through an OpenAI-compatible image generation API.
///
/// The last prompt and aspect ratio are remembered in the state file and
/// reused when omitted.
#[derive(Debug, Parser)]
#[command(name = "ai-image", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Image generation endpoint
    #[arg(long, env = "AI_IMAGE_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Image model name
    #[arg(long, env = "AI_IMAGE_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Abort the generation request after this many seconds (transport default if unset)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// File holding the last-used prompt and aspect ratio
    #[arg(long, default_value = ".ai_image_state.ron", global = true)]
    pub state_file: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a prompt and show (and save) the result
    Generate(GenerateArgs),
    /// Print the remembered prompt and aspect ratio
    Last,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Image description; defaults to the last submitted prompt
    pub prompt: Option<String>,

    /// Things the image should avoid
    #[arg(short, long)]
    pub negative: Option<String>,

    /// Aspect ratio: 1:1, 16:9, 9:16 or 3:2; defaults to the last used one
    #[arg(short, long)]
    pub aspect: Option<String>,

    /// Guidance strength; 8 and up asks for medium quality, 15 and up for high
    #[arg(short, long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub guidance: f64,

    /// Only print the image reference, do not write it to disk
    #[arg(long)]
    pub no_save: bool,

    /// Directory for saved images
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl Cli {
    pub fn log_settings(&self) -> LogSettings {
        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        let destination = match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        };
        LogSettings { destination, level }
    }

    pub fn client_settings(&self) -> Result<ClientSettings> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(MissingApiKey)?;
        Ok(ClientSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            ..ClientSettings::new(api_key)
        })
    }
}

impl GenerateArgs {
    pub fn save_settings(&self) -> SaveSettings {
        SaveSettings::new(self.out_dir.clone())
    }
}
