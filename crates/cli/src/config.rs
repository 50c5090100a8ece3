//! CLI settings
//!
//! Layered as defaults, then an optional TOML file, then `OOTD__`-prefixed
//! environment variables (`OOTD__CLIENT__BASE_URL=...`).

use anyhow::Result;
use config::{Config, Environment, File};
use ootd_core::tracing::LogFormat;
use ootd_http::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Backend connection
    #[serde(default)]
    pub client: ClientConfig,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Where `cli.log` is written
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_state_dir() -> PathBuf {
    // Check environment variable first, then fall back to system data dir
    if let Ok(state_dir) = std::env::var("OOTD_STATE_DIR") {
        PathBuf::from(state_dir)
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ootd")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            state_dir: default_state_dir(),
        }
    }
}

impl Settings {
    /// Load settings, reading `path` if given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        // Environment variables override file settings
        builder = builder.add_source(
            Environment::with_prefix("OOTD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
