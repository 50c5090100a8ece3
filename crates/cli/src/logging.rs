use anyhow::Result;
use ootd_core::tracing::{InstrumentationConfig, LogFormat, init_tracing};
use std::path::Path;
use tracing::Level;

/// Initialize logging for the CLI
///
/// Console output always; `{state_dir}/cli.log` as well unless disabled.
pub fn init_logging(
    level: Option<Level>,
    settings_level: &str,
    format: LogFormat,
    state_dir: &Path,
    no_file_log: bool,
) -> Result<()> {
    init_tracing(&instrumentation(
        level,
        settings_level,
        format,
        state_dir,
        no_file_log,
    ))
}

fn instrumentation(
    level: Option<Level>,
    settings_level: &str,
    format: LogFormat,
    state_dir: &Path,
    no_file_log: bool,
) -> InstrumentationConfig {
    // An explicit --log-level wins over the settings file
    let log_level = level.map_or_else(
        || settings_level.to_string(),
        |level| {
            let level = level.as_str().to_lowercase();
            format!("ootd={level},ootd_http={level},ootd_core={level}")
        },
    );

    let config = InstrumentationConfig {
        service_name: "ootd-cli".to_string(),
        log_level,
        format,
        ..InstrumentationConfig::default()
    };
    if no_file_log {
        config
    } else {
        config.with_log_file(state_dir.join("cli.log"))
    }
}
