//! Edit buffer backing the single editable line.

/// Live text and caret of the editable line.
///
/// The cursor is a char index so edits stay UTF-8 safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
    focused: bool,
}

impl EditBuffer {
    /// Start editing `initial` with the caret parked at the end, unfocused.
    pub fn new(initial: &str) -> Self {
        Self {
            text: initial.to_string(),
            cursor: char_count(initial),
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Gain focus. On a focus transition the selection collapses to the end
    /// of the content so typing appends. Returns whether focus changed.
    pub fn focus(&mut self) -> bool {
        if self.focused {
            return false;
        }
        self.focused = true;
        self.cursor = char_count(&self.text);
        true
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = byte_index_at_char(&self.text, self.cursor);
        self.text.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Insert pasted text; carriage returns become line breaks.
    pub fn insert_str(&mut self, pasted: &str) {
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        let byte_idx = byte_index_at_char(&self.text, self.cursor);
        self.text.insert_str(byte_idx, &normalized);
        self.cursor += char_count(&normalized);
    }

    /// Delete one char before the caret. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        delete_char_range(&mut self.text, self.cursor - 1, self.cursor);
        self.cursor -= 1;
        true
    }

    /// Delete one char at the caret. Returns whether anything changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= char_count(&self.text) {
            return false;
        }
        delete_char_range(&mut self.text, self.cursor, self.cursor + 1);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < char_count(&self.text) {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = line_start_char_index(&self.text, self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = line_end_char_index(&self.text, self.cursor);
    }

    /// Drop a stray leading line break left behind once the visible content
    /// has been erased. Returns whether the artifact was removed.
    pub fn strip_break_artifact(&mut self) -> bool {
        if !self.text.trim().is_empty() || !self.text.starts_with('\n') {
            return false;
        }
        self.text.remove(0);
        self.cursor = self.cursor.saturating_sub(1).min(char_count(&self.text));
        true
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Delete a char range represented in char indices.
fn delete_char_range(buffer: &mut String, start_char: usize, end_char: usize) {
    if start_char >= end_char {
        return;
    }
    let start = byte_index_at_char(buffer, start_char);
    let end = byte_index_at_char(buffer, end_char);
    buffer.replace_range(start..end, "");
}

/// Return the char index for the start of the current line.
fn line_start_char_index(buffer: &str, cursor: usize) -> usize {
    let mut idx = cursor;
    while idx > 0 {
        if char_at(buffer, idx - 1) == '\n' {
            break;
        }
        idx -= 1;
    }
    idx
}

/// Return the char index for the end of the current line.
fn line_end_char_index(buffer: &str, cursor: usize) -> usize {
    let len = char_count(buffer);
    let mut idx = cursor;
    while idx < len {
        if char_at(buffer, idx) == '\n' {
            break;
        }
        idx += 1;
    }
    idx
}

/// Convert a char index to a byte index, preserving UTF-8 boundaries.
pub(crate) fn byte_index_at_char(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Return the char value at index, or NUL when out of range.
fn char_at(s: &str, char_idx: usize) -> char {
    s.chars().nth(char_idx).unwrap_or('\0')
}

/// Return total char count for a UTF-8 string.
pub(crate) fn char_count(s: &str) -> usize {
    s.chars().count()
}
