//! The two console presentations.

use crate::panel::style::DEFAULT_INLINE_WIDTH_PERCENT;
use crate::panel::StylePreset;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Console presentation: full-surface app, or side panel beside host content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelVariant {
    /// Panel fills the surface and the session ends on its own once idle.
    #[default]
    App,
    /// Collapsible side panel; the host ends the session explicitly.
    Inline,
}

/// Event routing installed while a panel is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    /// Any key press refocuses the editable line.
    GlobalKeyRefocus,
    /// Clicking the panel body refocuses the editable line.
    PanelClickRefocus,
    /// Clicking the toggle button collapses/expands the panel.
    CollapseToggle,
}

impl PanelVariant {
    /// Whether an idle session ends on its own.
    pub fn auto_finish(self) -> bool {
        matches!(self, Self::App)
    }

    pub fn preset(self, inline_width_percent: Option<u16>) -> StylePreset {
        match self {
            Self::App => StylePreset::app(),
            Self::Inline => {
                StylePreset::inline(inline_width_percent.unwrap_or(DEFAULT_INLINE_WIDTH_PERCENT))
            }
        }
    }

    pub fn subscriptions(self) -> Vec<Subscription> {
        match self {
            Self::App => vec![Subscription::GlobalKeyRefocus],
            Self::Inline => vec![
                Subscription::GlobalKeyRefocus,
                Subscription::PanelClickRefocus,
                Subscription::CollapseToggle,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for PanelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "app" => Ok(Self::App),
            "inline" => Ok(Self::Inline),
            other => Err(format!("unknown panel variant '{other}' (expected app or inline)")),
        }
    }
}
