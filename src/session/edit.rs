//! Per-input edit session: keystroke routing for the editable line and the
//! one-shot completion that hands the submitted text back to the host.

use crate::panel::{EditTarget, TextPanel};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::oneshot;
use tracing::debug;

/// What one key press does to the editable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Commit,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Ignore,
}

/// Outcome of routing one key to the edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    /// Enter was pressed; the caller commits the line.
    Commit,
    Edited,
    Ignored,
}

pub(crate) fn reduce_key(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    match key.code {
        // Enter commits regardless of modifiers; the line never takes a break.
        KeyCode::Enter => KeyAction::Commit,
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            KeyAction::Insert(ch)
        }
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Delete => KeyAction::Delete,
        KeyCode::Left => KeyAction::Left,
        KeyCode::Right => KeyAction::Right,
        KeyCode::Home => KeyAction::Home,
        KeyCode::End => KeyAction::End,
        _ => KeyAction::Ignore,
    }
}

/// Lives exactly as long as one pending input.
pub(crate) struct EditSession {
    target: EditTarget,
    completion: Option<oneshot::Sender<String>>,
}

impl EditSession {
    pub(crate) fn new(target: EditTarget, completion: oneshot::Sender<String>) -> Self {
        Self {
            target,
            completion: Some(completion),
        }
    }

    pub(crate) fn target(&self) -> EditTarget {
        self.target
    }

    pub(crate) fn handle_key(&mut self, panel: &mut TextPanel, key: &KeyEvent) -> KeyOutcome {
        let action = reduce_key(key);
        if action == KeyAction::Commit {
            return KeyOutcome::Commit;
        }
        let Some(buffer) = panel.edit_buffer(self.target) else {
            return KeyOutcome::Ignored;
        };
        match action {
            KeyAction::Insert(ch) => buffer.insert_char(ch),
            KeyAction::Backspace => {
                buffer.backspace();
                if buffer.strip_break_artifact() {
                    debug!("removed leftover line break from emptied input");
                }
            }
            KeyAction::Delete => {
                buffer.delete();
            }
            KeyAction::Left => buffer.move_left(),
            KeyAction::Right => buffer.move_right(),
            KeyAction::Home => buffer.move_home(),
            KeyAction::End => buffer.move_end(),
            KeyAction::Commit | KeyAction::Ignore => return KeyOutcome::Ignored,
        }
        KeyOutcome::Edited
    }

    pub(crate) fn paste(&mut self, panel: &mut TextPanel, text: &str) -> bool {
        match panel.edit_buffer(self.target) {
            Some(buffer) => {
                buffer.insert_str(text);
                true
            }
            None => false,
        }
    }

    /// Deliver the submitted text. Only the first call has any effect.
    pub(crate) fn resolve(&mut self, value: String) {
        match self.completion.take() {
            Some(sender) => {
                if sender.send(value).is_err() {
                    debug!("input submitted after the waiting caller went away");
                }
            }
            None => debug!("input already resolved"),
        }
    }
}

/// Replace non-breaking spaces with plain spaces.
pub fn normalize_nbsp(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Split submitted text into whitespace-separated tokens.
///
/// Blank input yields a single empty token, so callers always get at least
/// one element.
pub fn split_tokens(text: &str) -> Vec<String> {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        vec![String::new()]
    } else {
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::StylePreset;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_commits_with_any_modifier() {
        assert_eq!(reduce_key(&press(KeyCode::Enter)), KeyAction::Commit);
        let shifted = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(reduce_key(&shifted), KeyAction::Commit);
    }

    #[test]
    fn control_chords_and_releases_are_ignored() {
        let ctrl = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(reduce_key(&ctrl), KeyAction::Ignore);

        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(reduce_key(&release), KeyAction::Ignore);
    }

    #[test]
    fn shifted_chars_insert() {
        let upper = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(reduce_key(&upper), KeyAction::Insert('A'));
    }

    #[test]
    fn nbsp_becomes_space() {
        assert_eq!(normalize_nbsp("a\u{a0}b\u{a0}\u{a0}c"), "a b  c");
        assert_eq!(normalize_nbsp("plain"), "plain");
    }

    #[test]
    fn tokens_split_on_whitespace_runs() {
        assert_eq!(split_tokens("  hello   world "), vec!["hello", "world"]);
        assert_eq!(split_tokens("a\tb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_input_yields_one_empty_token() {
        assert_eq!(split_tokens(""), vec![""]);
        assert_eq!(split_tokens("   "), vec![""]);
    }

    #[test]
    fn backspace_clears_leftover_break() {
        let mut panel = TextPanel::new(StylePreset::app());
        let line = panel.append_line("");
        let target = panel.set_editable(Some(line)).expect("editable");
        let (tx, _rx) = oneshot::channel();
        let mut session = EditSession::new(target, tx);

        session.paste(&mut panel, "\nx");
        let outcome = session.handle_key(&mut panel, &press(KeyCode::Backspace));
        assert_eq!(outcome, KeyOutcome::Edited);
        assert_eq!(panel.text(line).as_deref(), Some(""));
    }

    #[test]
    fn resolve_delivers_once() {
        let mut panel = TextPanel::new(StylePreset::app());
        let line = panel.append_line("");
        let target = panel.set_editable(Some(line)).expect("editable");
        let (tx, mut rx) = oneshot::channel();
        let mut session = EditSession::new(target, tx);

        session.resolve("first".into());
        session.resolve("second".into());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("first"));
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalized_text_has_no_nbsp_and_keeps_length(
                raw in proptest::string::string_regex("[a-z \u{a0}]{0,32}").expect("regex")
            ) {
                let normalized = normalize_nbsp(&raw);
                prop_assert!(!normalized.contains('\u{a0}'), "normalized text still contains U+00A0");
                prop_assert_eq!(normalized.chars().count(), raw.chars().count());
            }

            #[test]
            fn tokens_never_empty_and_never_contain_whitespace(
                raw in proptest::string::string_regex("[a-z \t\n]{0,32}").expect("regex")
            ) {
                let tokens = split_tokens(raw.trim());
                prop_assert!(!tokens.is_empty());
                for token in &tokens {
                    prop_assert!(!token.chars().any(char::is_whitespace));
                }
                if raw.trim().is_empty() {
                    prop_assert_eq!(tokens, vec![String::new()]);
                }
            }
        }
    }
}
