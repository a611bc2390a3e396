//! admitq - patient admission queue
//!
//! CLI entry point for the interactive session and the script runner.

use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use admitq::cli::{Cli, Command, OutputFormat, generate_after_help};
use admitq::config::Config;
use admitq::domain::Patient;
use admitq::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("admitq")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("admitq.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        interval_ms = config.service.interval_ms,
        stop_when_empty = config.service.stop_when_empty,
        "admitq loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Repl) => {
            debug!("main: running interactive session");
            repl::run_interactive(&config).await
        }
        Some(Command::Run { script, format }) => {
            debug!(?script, %format, "main: matched Run command");
            cmd_run(&config, &script, format).await
        }
    }
}

/// Execute a command script against a fresh queue
async fn cmd_run(config: &Config, script: &Path, format: OutputFormat) -> Result<()> {
    debug!(?script, %format, "cmd_run: called");
    let quiet = format == OutputFormat::Json;

    let queue = if script == Path::new("-") {
        debug!("cmd_run: reading script from stdin");
        repl::run_script(config, io::stdin().lock(), quiet).await?
    } else {
        let file = fs::File::open(script).context(format!("Failed to open script {}", script.display()))?;
        repl::run_script(config, BufReader::new(file), quiet).await?
    };

    if quiet {
        let queue = queue.lock().await;
        let patients: Vec<&Patient> = queue.snapshot().collect();
        println!("{}", serde_json::to_string_pretty(&patients)?);
    }

    info!(script = %script.display(), "Script finished");
    Ok(())
}
