//! ootd CLI - closet backend client

mod commands;
mod config;
mod logging;
mod navigator;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Credentials};
use config::Settings;
use navigator::TerminalNavigator;
use ootd_http::OotdClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "ootd")]
#[command(about = "Browse and manage your closet")]
#[command(version)]
struct Cli {
    /// Set logging level (overrides the settings file)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Settings file (TOML)
    #[arg(short = 'c', long, global = true, env = "OOTD_CONFIG")]
    config: Option<PathBuf>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    logging::init_logging(
        cli.log_level.map(Into::into),
        &settings.log_level,
        settings.log_format,
        &settings.state_dir,
        cli.no_file_log,
    )?;

    info!(base_url = %settings.client.base_url, "starting ootd");

    let navigator = Arc::new(TerminalNavigator::new("/"));
    let client = OotdClient::new(&settings.client, navigator)?;

    match cli.command.execute(&settings, &client, cli.credentials).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
