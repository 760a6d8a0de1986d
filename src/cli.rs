//! CLI argument parsing via clap.

use clap::Parser;
use console_panel::config::Config;
use console_panel::session::PanelVariant;
use std::path::PathBuf;

/// A line-oriented console drawn as a terminal panel, with a small demo host.
#[derive(Debug, Parser)]
#[command(name = "console-panel", version)]
pub struct Args {
    /// Path to config file (default: ./console-panel.toml or
    /// ~/.config/console-panel/console-panel.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Panel layout: `app` (full screen, ends when idle) or `inline` (side panel).
    #[arg(long = "variant", value_parser = parse_variant)]
    pub variant: Option<PanelVariant>,

    /// Idle delay in milliseconds before an app session ends on its own.
    #[arg(long = "idle-ms", value_name = "MS")]
    pub idle_ms: Option<u64>,

    /// Write diagnostics to this file instead of the default log path.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Flags win over every other config source.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(variant) = self.variant {
            config.console.variant = variant;
        }
        if let Some(idle_ms) = self.idle_ms {
            config.console.idle_ms = idle_ms;
        }
        if let Some(path) = &self.log_file {
            config.log.file = Some(path.clone());
        }
        if self.no_color {
            config.display.color = false;
        }
    }
}

fn parse_variant(raw: &str) -> Result<PanelVariant, String> {
    raw.parse()
}
