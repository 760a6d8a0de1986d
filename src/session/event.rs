//! Host events routed into a console session.

use crossterm::event::{Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

/// One input event as the session sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Key(KeyEvent),
    /// Bracketed paste; inserted into the editable line as-is.
    Paste(String),
    FocusGained,
    /// The editable line lost focus (the terminal window did).
    FocusLost,
    /// Primary-button press at a surface cell.
    Click { column: u16, row: u16 },
    ScrollUp,
    ScrollDown,
    Resize { cols: u16, rows: u16 },
}

impl PanelEvent {
    /// Translate a terminal event; returns `None` for events the panel ignores.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(Self::Key(key)),
            Event::Paste(text) => Some(Self::Paste(text)),
            Event::FocusGained => Some(Self::FocusGained),
            Event::FocusLost => Some(Self::FocusLost),
            Event::Resize(cols, rows) => Some(Self::Resize { cols, rows }),
            Event::Mouse(mouse) => Self::from_mouse(mouse),
        }
    }

    fn from_mouse(mouse: MouseEvent) -> Option<Self> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Self::Click {
                column: mouse.column,
                row: mouse.row,
            }),
            MouseEventKind::ScrollUp => Some(Self::ScrollUp),
            MouseEventKind::ScrollDown => Some(Self::ScrollDown),
            _ => None,
        }
    }
}
