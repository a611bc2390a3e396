//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LOCAL_CONFIG_FILE;

/// admitq - patient admission queue
#[derive(Parser)]
#[command(
    name = "aq",
    about = "Patient admission queue with elevated/normal alternation",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; defaults to the interactive session
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive session
    Repl,

    /// Execute session commands from a script file (`-` reads stdin)
    Run {
        /// Script with one session command per line
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("admitq")
        .join("logs")
        .join("admitq.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with config and log locations
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Config is read from --config, then ./");
    help.push_str(LOCAL_CONFIG_FILE);
    if let Some(config_dir) = dirs::config_dir() {
        help.push_str(&format!(
            ", then {}",
            config_dir.join("admitq").join("admitq.yml").display()
        ));
    }
    help.push('\n');

    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for `run`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Echo each command followed by its reply
    #[default]
    Text,
    /// Print only the final queue as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
