//! Line model owned by the text panel.

use super::markup;

/// Opaque position of a line inside its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineHandle(pub(crate) usize);

impl LineHandle {
    /// Zero-based insertion index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a line's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Host output; content is markup and follows the preset's whitespace flow.
    Output,
    /// Typed by the user; always drawn with whitespace preserved.
    Input,
}

/// One displayed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub(crate) content: String,
    pub(crate) kind: LineKind,
    pub(crate) editable: bool,
}

impl Line {
    pub(crate) fn output(content: &str) -> Self {
        Self {
            content: content.to_string(),
            kind: LineKind::Output,
            editable: false,
        }
    }

    /// Raw markup content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Rendered text with markup stripped.
    pub fn text(&self) -> String {
        markup::plain_text(&self.content)
    }
}

/// Read-only copy of a line handed to hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub handle: LineHandle,
    pub text: String,
    pub kind: LineKind,
    pub editable: bool,
}
