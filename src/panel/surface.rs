//! Host surfaces the panel draws onto.
//!
//! A [`Surface`] is whatever stands in for the page the panel is mounted
//! into. [`TerminalSurface`] owns the real terminal; [`MemorySurface`]
//! records frames so sessions can be driven headless in tests.

use super::layout::{Rect, Row};
use super::style::{StylePreset, COLOR_TOGGLE_BG, COLOR_TOGGLE_TEXT, LINE_PADDING};
use crossterm::cursor::{Hide, MoveTo, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture,
};
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use unicode_width::UnicodeWidthStr;

/// Collapse toggle as drawn in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton {
    pub rect: Rect,
    pub label: &'static str,
    pub collapsed: bool,
}

/// Everything a surface needs to draw the panel once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cols: u16,
    pub rows: u16,
    pub preset: StylePreset,
    /// Panel body; `None` while collapsed.
    pub panel: Option<Rect>,
    pub toggle: Option<ToggleButton>,
    /// Visible wrapped rows, top to bottom, starting at the panel's top edge.
    pub lines: Vec<Row>,
    /// Absolute caret cell when the editable line is focused and visible.
    pub cursor: Option<(u16, u16)>,
}

impl Frame {
    /// Visible row text, handy for assertions.
    pub fn visible_text(&self) -> Vec<String> {
        self.lines.iter().map(Row::text).collect()
    }
}

/// Drawing target for a mounted panel.
pub trait Surface: Send {
    /// Current size in cells as `(cols, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;
    /// Prepare the surface for drawing with `preset`.
    fn attach(&mut self, preset: &StylePreset) -> io::Result<()>;
    /// Present one frame.
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;
    /// Release the surface; drawing stops until the next attach.
    fn detach(&mut self) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Full-screen terminal surface on stdout.
///
/// Attaching enters the alternate screen, raw mode and mouse/focus/paste
/// reporting; detaching (or dropping) restores the terminal.
pub struct TerminalSurface {
    out: io::Stdout,
    attached: bool,
    last_layout: Option<(Option<Rect>, Option<Rect>)>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            attached: false,
            last_layout: None,
        }
    }

    fn base_colors(&mut self, preset: &StylePreset) -> io::Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if preset.color {
            queue!(
                self.out,
                SetBackgroundColor(preset.background),
                SetForegroundColor(preset.text)
            )?;
        } else {
            queue!(self.out, ResetColor)?;
        }
        Ok(())
    }

    fn draw_row(
        &mut self,
        preset: &StylePreset,
        panel: Rect,
        y: u16,
        row: Option<&Row>,
    ) -> io::Result<()> {
        queue!(self.out, MoveTo(panel.x, y))?;
        self.base_colors(preset)?;
        let pad = usize::from(LINE_PADDING.min(panel.width));
        queue!(self.out, Print(" ".repeat(pad)))?;
        let mut used = pad;
        if let Some(row) = row {
            for run in &row.runs {
                if run.style.bold {
                    queue!(self.out, SetAttribute(Attribute::Bold))?;
                }
                if run.style.italic {
                    queue!(self.out, SetAttribute(Attribute::Italic))?;
                }
                if run.style.underline {
                    queue!(self.out, SetAttribute(Attribute::Underlined))?;
                }
                // Control chars (tabs, stray breaks) draw as blanks.
                let text: String = run
                    .text
                    .chars()
                    .map(|c| if c.is_control() { ' ' } else { c })
                    .collect();
                queue!(self.out, Print(text))?;
                self.base_colors(preset)?;
            }
            used += row.width;
        }
        let remaining = usize::from(panel.width).saturating_sub(used);
        queue!(self.out, Print(" ".repeat(remaining)))?;
        Ok(())
    }

    fn draw_toggle(&mut self, preset: &StylePreset, toggle: &ToggleButton) -> io::Result<()> {
        let rect = toggle.rect;
        let label_row = rect.y + rect.height / 2;
        for y in rect.y..rect.y.saturating_add(rect.height) {
            queue!(self.out, MoveTo(rect.x, y), SetAttribute(Attribute::Reset))?;
            if preset.color {
                queue!(
                    self.out,
                    SetBackgroundColor(COLOR_TOGGLE_BG),
                    SetForegroundColor(COLOR_TOGGLE_TEXT)
                )?;
            } else {
                queue!(self.out, SetAttribute(Attribute::Reverse))?;
            }
            let cell = if y == label_row { toggle.label } else { "" };
            let width = usize::from(rect.width);
            let pad = width.saturating_sub(UnicodeWidthStr::width(cell));
            queue!(self.out, Print(cell), Print(" ".repeat(pad)))?;
        }
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn attach(&mut self, _preset: &StylePreset) -> io::Result<()> {
        if self.attached {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            EnableBracketedPaste,
            Clear(ClearType::All)
        )?;
        self.attached = true;
        self.last_layout = None;
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        if !self.attached {
            return Ok(());
        }
        queue!(self.out, Hide)?;
        let layout = (frame.panel, frame.toggle.as_ref().map(|t| t.rect));
        if self.last_layout != Some(layout) {
            queue!(
                self.out,
                SetAttribute(Attribute::Reset),
                ResetColor,
                Clear(ClearType::All)
            )?;
            self.last_layout = Some(layout);
        }
        if let Some(panel) = frame.panel {
            for dy in 0..panel.height {
                let row = frame.lines.get(usize::from(dy));
                self.draw_row(&frame.preset, panel, panel.y + dy, row)?;
            }
        }
        if let Some(toggle) = &frame.toggle {
            self.draw_toggle(&frame.preset, toggle)?;
        }
        queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some((x, y)) = frame.cursor {
            queue!(self.out, MoveTo(x, y), SetCursorStyle::BlinkingUnderScore, Show)?;
        }
        self.out.flush()
    }

    fn detach(&mut self) -> io::Result<()> {
        if !self.attached {
            return Ok(());
        }
        let (escapes, raw_mode) = restore_terminal(&mut self.out, terminal::disable_raw_mode);
        // Stay attached until raw mode is off so drop gets another try.
        if raw_mode.is_ok() {
            self.attached = false;
        }
        escapes.and(raw_mode)
    }
}

/// Undo everything `attach` turned on. Raw mode is released even when the
/// escape sequences cannot be written; both outcomes are returned.
fn restore_terminal<W, F>(out: &mut W, disable_raw_mode: F) -> (io::Result<()>, io::Result<()>)
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
{
    let escapes = execute!(
        out,
        DisableBracketedPaste,
        DisableFocusChange,
        DisableMouseCapture,
        SetCursorStyle::DefaultUserShape,
        Show,
        LeaveAlternateScreen
    );
    (escapes, disable_raw_mode())
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.detach();
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MemoryState {
    size: (u16, u16),
    attached: bool,
    preset: Option<StylePreset>,
    frames: usize,
    last: Option<Frame>,
}

/// In-memory surface; clones share the same recorded state.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                size: (cols, rows),
                attached: false,
                preset: None,
                frames: 0,
                last: None,
            })),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the reported size; the next draw picks it up.
    pub fn resize(&self, cols: u16, rows: u16) {
        self.state().size = (cols, rows);
    }

    pub fn is_attached(&self) -> bool {
        self.state().attached
    }

    pub fn preset(&self) -> Option<StylePreset> {
        self.state().preset
    }

    /// Number of frames drawn so far.
    pub fn frame_count(&self) -> usize {
        self.state().frames
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.state().last.clone()
    }

    /// Text of the rows visible in the last frame.
    pub fn visible_text(&self) -> Vec<String> {
        self.state()
            .last
            .as_ref()
            .map(Frame::visible_text)
            .unwrap_or_default()
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.state().size)
    }

    fn attach(&mut self, preset: &StylePreset) -> io::Result<()> {
        let mut state = self.state();
        state.attached = true;
        state.preset = Some(*preset);
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        let mut state = self.state();
        if !state.attached {
            return Ok(());
        }
        state.frames += 1;
        state.last = Some(frame.clone());
        Ok(())
    }

    fn detach(&mut self) -> io::Result<()> {
        self.state().attached = false;
        Ok(())
    }
}
