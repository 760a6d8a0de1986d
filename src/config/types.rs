//! Configuration data model.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{DEFAULT_IDLE_MS, DEFAULT_LOG_LEVEL};
use crate::panel::style::DEFAULT_INLINE_WIDTH_PERCENT;
use crate::session::{ConsoleOptions, PanelVariant, DEFAULT_END_MESSAGE};

/// Top-level configuration (`console-panel.toml`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub console: ConsoleConfig,
    pub inline: InlineConfig,
    pub display: DisplayConfig,
    pub log: LogConfig,
}

impl Config {
    /// Session tunables derived from this config.
    pub fn console_options(&self) -> ConsoleOptions {
        ConsoleOptions {
            idle_delay: Duration::from_millis(self.console.idle_ms),
            end_message: self.console.end_message.clone(),
            inline_width_percent: self.inline.width_percent,
            start_collapsed: self.inline.start_collapsed,
            color: self.display.color,
        }
    }
}

/// `[console]`: session behavior.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub variant: PanelVariant,
    /// Idle delay before an app session ends on its own.
    pub idle_ms: u64,
    pub end_message: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            variant: PanelVariant::App,
            idle_ms: DEFAULT_IDLE_MS,
            end_message: DEFAULT_END_MESSAGE.to_string(),
        }
    }
}

/// `[inline]`: side panel geometry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InlineConfig {
    /// Share of the surface width taken by the panel.
    pub width_percent: u16,
    pub start_collapsed: bool,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            width_percent: DEFAULT_INLINE_WIDTH_PERCENT,
            start_collapsed: false,
        }
    }
}

/// `[display]`: rendering preferences.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// `[log]`: diagnostics written while the panel owns the terminal.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; defaults to the config dir.
    pub file: Option<PathBuf>,
    /// Filter used when `CONSOLE_PANEL_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Human-readable description of the winning source.
    pub source: String,
}
