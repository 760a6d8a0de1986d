//! Default configuration constants.

/// File name looked up in the working directory and the global config dir.
pub const CONFIG_FILE_NAME: &str = "console-panel.toml";
/// Directory under the config root holding the global config and log.
pub const CONFIG_DIR_NAME: &str = "console-panel";
/// Log file name used when no explicit log path is configured.
pub const LOG_FILE_NAME: &str = "console-panel.log";
/// Env var holding the tracing filter directive.
pub const LOG_FILTER_ENV: &str = "CONSOLE_PANEL_LOG";

pub(super) const DEFAULT_IDLE_MS: u64 = 10;
pub(super) const DEFAULT_LOG_LEVEL: &str = "info";
pub(super) const MIN_INLINE_WIDTH_PERCENT: u16 = 10;
pub(super) const MAX_INLINE_WIDTH_PERCENT: u16 = 100;
