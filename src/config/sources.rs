//! Config-file source discovery.
//!
//! Source order: explicit path > local file > global file > built-in defaults.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ConfigSource {
    /// `--config <path>`.
    Explicit(PathBuf),
    /// `./console-panel.toml`.
    Local,
    /// `<config root>/console-panel/console-panel.toml`.
    Global(PathBuf),
    BuiltInDefaults,
}

impl ConfigSource {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Explicit(path) | Self::Global(path) => path.display().to_string(),
            Self::Local => format!("./{CONFIG_FILE_NAME}"),
            Self::BuiltInDefaults => "built-in defaults".to_string(),
        }
    }
}

/// Read config text from the highest-precedence available source.
pub(super) fn read_config_text_with_sources<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // An explicit path must exist; a missing one is an error, not a fallback.
    if let Some(path) = path_override {
        let text = read_file(path)?;
        return Ok((text, ConfigSource::Explicit(path.to_path_buf())));
    }

    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok((text, ConfigSource::Local));
    }

    if let Some(dir) = config_root() {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

/// Root directory for per-user config (`$XDG_CONFIG_HOME`, else `~/.config`).
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}
