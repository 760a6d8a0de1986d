//! Environment overrides.
//!
//! Applied after the config file and before CLI flags.

use crate::error::ConfigError;
use crate::session::PanelVariant;

use super::Config;

pub(super) const VARIANT_ENV: &str = "CONSOLE_PANEL_VARIANT";
pub(super) const IDLE_MS_ENV: &str = "CONSOLE_PANEL_IDLE_MS";
pub(super) const NO_COLOR_ENV: &str = "CONSOLE_PANEL_NO_COLOR";

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_empty(env_lookup, VARIANT_ENV) {
        config.console.variant = raw
            .parse::<PanelVariant>()
            .map_err(|msg| ConfigError::Invalid(format!("{VARIANT_ENV}: {msg}")))?;
    }
    if let Some(raw) = non_empty(env_lookup, IDLE_MS_ENV) {
        config.console.idle_ms = raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {IDLE_MS_ENV} value `{raw}`: expected milliseconds as a non-negative integer"
            ))
        })?;
    }
    if let Some(raw) = non_empty(env_lookup, NO_COLOR_ENV) {
        // Any value except an explicit false turns color off.
        let off = !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no");
        if off {
            config.display.color = false;
        }
    }
    Ok(())
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name).filter(|value| !value.trim().is_empty())
}
