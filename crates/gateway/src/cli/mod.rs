pub mod ask;
pub mod config;
pub mod discover;
pub mod snapshot;

use clap::{Parser, Subcommand};

use lq_domain::error::Error;

/// learnquery: answers questions about learning-platform data through a
/// local inference server.
#[derive(Debug, Parser)]
#[command(name = "learnquery", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the context server (default when no subcommand is given).
    Serve,
    /// Answer one question and exit.
    Ask {
        /// The question to answer.
        question: String,
        /// Print the answer with its tier, endpoint and model as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show inference endpoint candidates and resolve the working one.
    Discover {
        /// Probe every candidate and report which ones answer.
        #[arg(long)]
        probe: bool,
    },
    /// Build a snapshot from the table directory and print it.
    Snapshot,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `LQ_CONFIG` (default
/// `learnquery.toml`). A missing file means all defaults.
pub fn load_config() -> anyhow::Result<(lq_domain::config::Config, String)> {
    let config_path = std::env::var("LQ_CONFIG").unwrap_or_else(|_| "learnquery.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(path: &str) -> anyhow::Result<lq_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(lq_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| Error::Config(format!("reading {path}: {e}")))?;
    let config = toml::from_str(&raw).map_err(|e| Error::Config(format!("parsing {path}: {e}")))?;
    Ok(config)
}
