//! Style presets for the two panel layouts.
//!
//! This is the single place to tweak panel colors, glyphs and geometry. A
//! preset is installed once at mount time.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Glyphs / geometry
// ---------------------------------------------------------------------------

pub const PANEL_ID: &str = "console-panel";
pub const TOGGLE_LABEL: &str = "||";
pub const TOGGLE_WIDTH: u16 = 2;
pub const LINE_PADDING: u16 = 1;
pub const DEFAULT_INLINE_WIDTH_PERCENT: u16 = 30;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_PANEL_BG: Color = Color::Black;
pub const COLOR_PANEL_TEXT: Color = Color::White;
pub const COLOR_TOGGLE_BG: Color = Color::DarkGrey;
pub const COLOR_TOGGLE_TEXT: Color = Color::White;

/// Which of the two layouts a preset draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    /// Occupies the whole surface.
    FullPanel,
    /// Right-hand side panel with a collapse toggle on its left edge.
    SidePanel { width_percent: u16 },
}

/// Colors and flow rules applied to the whole panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    pub kind: PresetKind,
    pub background: Color,
    pub text: Color,
    /// Keep whitespace runs as typed instead of collapsing them.
    pub preserve_whitespace: bool,
    /// Emit colors at all (`--no-color` turns this off).
    pub color: bool,
}

impl StylePreset {
    /// Full-bleed preset used by the app variant.
    pub fn app() -> Self {
        Self {
            kind: PresetKind::FullPanel,
            background: COLOR_PANEL_BG,
            text: COLOR_PANEL_TEXT,
            preserve_whitespace: false,
            color: true,
        }
    }

    /// Side panel preset used by the inline variant.
    pub fn inline(width_percent: u16) -> Self {
        Self {
            kind: PresetKind::SidePanel {
                width_percent: width_percent.clamp(10, 100),
            },
            background: COLOR_PANEL_BG,
            text: COLOR_PANEL_TEXT,
            preserve_whitespace: true,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn has_toggle(&self) -> bool {
        matches!(self.kind, PresetKind::SidePanel { .. })
    }
}
