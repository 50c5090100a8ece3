//! Configuration for tracing
//!
//! This module provides the configuration type used to set up the tracing
//! subscriber: filter, output format, and an optional log file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format of the console layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Main instrumentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Service name recorded at startup
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "ootd_http=debug")
    pub log_level: String,
    /// Console output format
    #[serde(default)]
    pub format: LogFormat,
    /// Also write plain-text logs to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            service_name: "ootd".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl InstrumentationConfig {
    /// Write logs to a file in addition to the console
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}
