//! Configuration loading.
//!
//! Precedence, highest first: CLI flags (applied by the binary), environment
//! variables, `--config <path>`, `./console-panel.toml`,
//! `$XDG_CONFIG_HOME/console-panel/console-panel.toml`, built-in defaults.

mod defaults;
mod env;
mod sources;
mod types;

pub use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME, LOG_FILTER_ENV};
pub use sources::config_root_dir;
pub use types::{Config, ConsoleConfig, DisplayConfig, InlineConfig, LoadedConfig, LogConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use defaults::{MAX_INLINE_WIDTH_PERCENT, MIN_INLINE_WIDTH_PERCENT};
use env::apply_env_overrides;
use sources::read_config_text_with_sources;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    Ok(LoadedConfig {
        config,
        source: source.describe(),
    })
}

/// Reject values the panel cannot honor.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let width = config.inline.width_percent;
    if !(MIN_INLINE_WIDTH_PERCENT..=MAX_INLINE_WIDTH_PERCENT).contains(&width) {
        return Err(ConfigError::Invalid(format!(
            "inline.width_percent must be between {MIN_INLINE_WIDTH_PERCENT} and {MAX_INLINE_WIDTH_PERCENT}, got {width}"
        )));
    }
    if config.log.level.trim().is_empty() {
        return Err(ConfigError::Invalid("log.level must not be empty".into()));
    }
    Ok(())
}

/// Log file path: configured path, else `<config root>/console-panel/console-panel.log`.
pub fn log_file_path(config: &Config) -> Option<PathBuf> {
    config
        .log
        .file
        .clone()
        .or_else(|| config_root_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(LOG_FILE_NAME)))
}
