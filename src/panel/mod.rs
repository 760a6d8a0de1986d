//! Scrollable text panel: an ordered list of lines, at most one of which is
//! editable, drawn onto a [`Surface`].

pub mod edit;
pub mod layout;
pub mod line;
pub mod markup;
pub mod style;
pub mod surface;

pub use edit::EditBuffer;
pub use layout::Rect;
pub use line::{Line, LineHandle, LineKind, LineSnapshot};
pub use style::StylePreset;
pub use surface::{Frame, MemorySurface, Surface, TerminalSurface, ToggleButton};

use layout::{PanelGeometry, Row};
use std::io;
use style::{PANEL_ID, TOGGLE_LABEL};
use tracing::{debug, warn};

/// Mounted panel root as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRoot {
    pub id: &'static str,
    /// Panel body at mount time; `None` when mounted collapsed.
    pub area: Option<Rect>,
    pub toggle: Option<Rect>,
}

/// Capability to edit one specific line.
///
/// Handed out by [`TextPanel::set_editable`]; stale targets stop working as
/// soon as a different line (or none) becomes editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTarget {
    handle: LineHandle,
}

impl EditTarget {
    pub fn handle(&self) -> LineHandle {
        self.handle
    }
}

/// What a surface cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Panel,
    Toggle,
    Outside,
}

/// Line store plus presentation state for one mounted panel.
pub struct TextPanel {
    preset: StylePreset,
    lines: Vec<Line>,
    editing: Option<(LineHandle, EditBuffer)>,
    collapsed: bool,
    /// Rows scrolled back from the bottom; zero follows new output.
    scroll_back: usize,
    surface: Option<Box<dyn Surface>>,
}

impl TextPanel {
    pub fn new(preset: StylePreset) -> Self {
        Self {
            preset,
            lines: Vec::new(),
            editing: None,
            collapsed: false,
            scroll_back: 0,
            surface: None,
        }
    }

    /// Start collapsed (side panel only).
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed && self.preset.has_toggle();
        self
    }

    pub fn preset(&self) -> &StylePreset {
        &self.preset
    }

    /// Attach to `surface` and draw the (empty) root.
    ///
    /// Mounting again replaces the previous surface; the old one is detached.
    pub fn mount(&mut self, mut surface: Box<dyn Surface>) -> io::Result<PanelRoot> {
        if let Some(mut previous) = self.surface.take() {
            debug!("replacing previously mounted surface");
            if let Err(err) = previous.detach() {
                warn!(error = %err, "failed to detach previous surface");
            }
        }
        surface.attach(&self.preset)?;
        let (cols, rows) = surface.size()?;
        self.surface = Some(surface);
        let geometry = self.geometry(cols, rows);
        self.render()?;
        Ok(PanelRoot {
            id: PANEL_ID,
            area: geometry.panel,
            toggle: geometry.toggle,
        })
    }

    /// Detach from the surface. Lines are kept.
    pub fn unmount(&mut self) -> io::Result<()> {
        match self.surface.take() {
            Some(mut surface) => surface.detach(),
            None => Ok(()),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Append one non-editable line of markup at the bottom.
    pub fn append_line(&mut self, content: &str) -> LineHandle {
        let handle = LineHandle(self.lines.len());
        self.lines.push(Line::output(content));
        self.scroll_back = 0;
        handle
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Make `handle` the single editable line, or none.
    ///
    /// The previously editable line is demoted: its typed text is frozen as
    /// escaped content so it renders literally from then on. Returns the edit
    /// capability for the new line.
    pub fn set_editable(&mut self, handle: Option<LineHandle>) -> Option<EditTarget> {
        if let (Some(previous), Some(next)) = (self.editable(), handle) {
            if previous != next {
                warn!(
                    previous = previous.index(),
                    "editable line replaced without being demoted first"
                );
            }
        }
        self.demote_editable();
        let handle = handle?;
        (handle.index() < self.lines.len()).then(|| self.promote(handle))
    }

    /// Append an empty line and make it the editable one.
    pub fn append_editable_line(&mut self) -> EditTarget {
        if let Some(previous) = self.editable() {
            warn!(
                previous = previous.index(),
                "editable line replaced without being demoted first"
            );
        }
        self.demote_editable();
        let handle = self.append_line("");
        self.promote(handle)
    }

    fn demote_editable(&mut self) {
        let Some((previous, buffer)) = self.editing.take() else {
            return;
        };
        if let Some(line) = self.lines.get_mut(previous.index()) {
            line.content = markup::escape(&buffer.into_text());
            line.kind = LineKind::Input;
            line.editable = false;
        }
    }

    fn promote(&mut self, handle: LineHandle) -> EditTarget {
        let mut buffer = EditBuffer::default();
        if let Some(line) = self.lines.get_mut(handle.index()) {
            buffer = EditBuffer::new(&line.text());
            line.kind = LineKind::Input;
            line.editable = true;
        }
        self.editing = Some((handle, buffer));
        self.scroll_back = 0;
        EditTarget { handle }
    }

    /// Currently editable line, if any.
    pub fn editable(&self) -> Option<LineHandle> {
        self.editing.as_ref().map(|(handle, _)| *handle)
    }

    /// Rendered text of a line; for the editable line this is the live buffer.
    pub fn text(&self, handle: LineHandle) -> Option<String> {
        if let Some((editing, buffer)) = &self.editing {
            if *editing == handle {
                return Some(buffer.text().to_string());
            }
        }
        self.lines.get(handle.index()).map(Line::text)
    }

    pub fn snapshot(&self) -> Vec<LineSnapshot> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let handle = LineHandle(idx);
                LineSnapshot {
                    handle,
                    text: self.text(handle).unwrap_or_default(),
                    kind: line.kind,
                    editable: line.editable,
                }
            })
            .collect()
    }

    /// Edit buffer for `target`, if it is still the editable line.
    pub fn edit_buffer(&mut self, target: EditTarget) -> Option<&mut EditBuffer> {
        match self.editing.as_mut() {
            Some((handle, buffer)) if *handle == target.handle => Some(buffer),
            _ => None,
        }
    }

    /// Focus the editable line. Returns whether focus changed.
    pub fn focus_editable(&mut self) -> bool {
        match self.editing.as_mut() {
            Some((_, buffer)) => {
                let changed = buffer.focus();
                if changed {
                    self.scroll_back = 0;
                }
                changed
            }
            None => false,
        }
    }

    pub fn blur_editable(&mut self) {
        if let Some((_, buffer)) = self.editing.as_mut() {
            buffer.blur();
        }
    }

    pub fn is_editable_focused(&self) -> bool {
        self.editing
            .as_ref()
            .is_some_and(|(_, buffer)| buffer.is_focused())
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Flip the collapsed flag (side panel only). Returns the new state.
    pub fn toggle_collapsed(&mut self) -> bool {
        if self.preset.has_toggle() {
            self.collapsed = !self.collapsed;
            debug!(collapsed = self.collapsed, "panel toggled");
        }
        self.collapsed
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(rows);
    }

    /// Classify a surface cell.
    pub fn hit_test(&self, column: u16, row: u16) -> io::Result<HitTarget> {
        let (cols, rows) = self.surface_size()?;
        let geometry = self.geometry(cols, rows);
        if geometry.toggle.is_some_and(|rect| rect.contains(column, row)) {
            return Ok(HitTarget::Toggle);
        }
        if geometry.panel.is_some_and(|rect| rect.contains(column, row)) {
            return Ok(HitTarget::Panel);
        }
        Ok(HitTarget::Outside)
    }

    /// Compose the current frame.
    pub fn frame(&self) -> io::Result<Frame> {
        let (cols, rows) = self.surface_size()?;
        Ok(self.compose(cols, rows).0)
    }

    /// Draw the current frame onto the mounted surface; no-op when unmounted.
    pub fn render(&mut self) -> io::Result<()> {
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };
        let (cols, rows) = surface.size()?;
        let (frame, max_back) = self.compose(cols, rows);
        // Clamp so scrolling past the top stops at the first row.
        self.scroll_back = self.scroll_back.min(max_back);
        match self.surface.as_mut() {
            Some(surface) => surface.draw(&frame),
            None => Ok(()),
        }
    }

    fn surface_size(&self) -> io::Result<(u16, u16)> {
        match self.surface.as_ref() {
            Some(surface) => surface.size(),
            None => Ok((0, 0)),
        }
    }

    fn geometry(&self, cols: u16, rows: u16) -> PanelGeometry {
        layout::panel_geometry(self.preset.kind, self.collapsed, cols, rows)
    }

    /// Wrap every line for `text_cols`, returning rows and the caret cell.
    fn wrapped_rows(&self, text_cols: usize) -> (Vec<Row>, Option<(usize, usize)>) {
        let mut rows = Vec::new();
        let mut cursor = None;
        for (idx, line) in self.lines.iter().enumerate() {
            let wrapped = match &self.editing {
                Some((handle, buffer)) if handle.index() == idx => {
                    let fragments = layout::literal_fragments(buffer.text());
                    let caret = buffer.is_focused().then_some(buffer.cursor());
                    layout::wrap_fragments(&fragments, text_cols, caret)
                }
                _ => {
                    let fragments = markup::parse(&line.content);
                    let fragments = if self.preset.preserve_whitespace
                        || line.kind == LineKind::Input
                    {
                        fragments
                    } else {
                        layout::collapse_whitespace(fragments)
                    };
                    layout::wrap_fragments(&fragments, text_cols, None)
                }
            };
            if let Some((row, col)) = wrapped.cursor {
                cursor = Some((rows.len() + row, col));
            }
            rows.extend(wrapped.rows);
        }
        (rows, cursor)
    }

    /// Build the frame and report how far back scrolling can reach.
    fn compose(&self, cols: u16, rows: u16) -> (Frame, usize) {
        let geometry = self.geometry(cols, rows);
        let toggle = geometry.toggle.map(|rect| ToggleButton {
            rect,
            label: TOGGLE_LABEL,
            collapsed: self.collapsed,
        });
        let mut frame = Frame {
            cols,
            rows,
            preset: self.preset,
            panel: geometry.panel,
            toggle,
            lines: Vec::new(),
            cursor: None,
        };
        let Some(panel) = geometry.panel else {
            return (frame, 0);
        };

        let (all_rows, cursor) = self.wrapped_rows(layout::text_columns(panel));
        let height = usize::from(panel.height);
        let max_back = all_rows.len().saturating_sub(height);
        let back = self.scroll_back.min(max_back);
        let end = all_rows.len() - back;
        let start = end.saturating_sub(height);

        frame.cursor = cursor.and_then(|(row, col)| {
            if row < start || row >= end {
                return None;
            }
            let x = usize::from(panel.x) + usize::from(style::LINE_PADDING) + col;
            let y = usize::from(panel.y) + (row - start);
            Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
        });
        frame.lines = all_rows[start..end].to_vec();
        (frame, max_back)
    }
}

impl Drop for TextPanel {
    fn drop(&mut self) {
        if let Err(err) = self.unmount() {
            warn!(error = %err, "failed to detach surface on drop");
        }
    }
}
