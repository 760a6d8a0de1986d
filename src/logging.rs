//! File-backed tracing setup.
//!
//! The panel owns the terminal, so diagnostics go to a log file rather than
//! stderr. `CONSOLE_PANEL_LOG` takes an `EnvFilter` directive and wins over
//! the configured level.

use crate::config::LOG_FILTER_ENV;
use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Build the filter: env directive if set and valid, else `default_level`.
pub fn build_filter(
    env_directive: Option<&str>,
    default_level: &str,
) -> Result<EnvFilter, ConfigError> {
    if let Some(directive) = env_directive.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directive).map_err(|err| {
            ConfigError::Invalid(format!("invalid {LOG_FILTER_ENV} directive `{directive}`: {err}"))
        });
    }
    EnvFilter::try_new(default_level)
        .map_err(|err| ConfigError::Invalid(format!("invalid log.level `{default_level}`: {err}")))
}

/// Install a global subscriber appending to `path`.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_file_logging(path: &Path, default_level: &str) -> Result<bool, ConfigError> {
    let env_directive = std::env::var(LOG_FILTER_ENV).ok();
    let filter = build_filter(env_directive.as_deref(), default_level)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();
    Ok(installed)
}
