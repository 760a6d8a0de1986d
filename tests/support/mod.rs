//! Shared helpers for driving a console headless over a memory surface.

#![allow(dead_code)]

use console_panel::panel::{LineKind, MemorySurface};
use console_panel::session::{Console, ConsoleOptions, PanelEvent, PanelVariant, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const COLS: u16 = 80;
pub const ROWS: u16 = 24;

/// Mount a console of `variant` onto a fresh 80x24 memory surface.
pub fn mounted(variant: PanelVariant) -> (Console, MemorySurface) {
    mounted_with(variant, ConsoleOptions::default())
}

pub fn mounted_with(variant: PanelVariant, options: ConsoleOptions) -> (Console, MemorySurface) {
    let surface = MemorySurface::new(COLS, ROWS);
    let console = Console::with_options(variant, options);
    console.mount(surface.clone()).expect("memory surface mounts");
    (console, surface)
}

pub fn press(console: &Console, code: KeyCode) {
    console
        .dispatch(PanelEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .expect("dispatch key");
}

pub fn type_text(console: &Console, text: &str) {
    for ch in text.chars() {
        press(console, KeyCode::Char(ch));
    }
}

/// Type `text` and press Enter.
pub fn submit(console: &Console, text: &str) {
    type_text(console, text);
    press(console, KeyCode::Enter);
}

/// Yield until the console is waiting for input.
pub async fn until_awaiting(console: &Console) {
    let mut state = console.watch_state();
    while *state.borrow_and_update() != SessionState::AwaitingInput {
        state.changed().await.expect("console alive");
    }
}

pub fn editable_count(console: &Console) -> usize {
    console.lines().iter().filter(|line| line.editable).count()
}

pub fn texts(console: &Console) -> Vec<String> {
    console.lines().into_iter().map(|line| line.text).collect()
}

pub fn last_text(console: &Console) -> Option<String> {
    console.lines().pop().map(|line| line.text)
}

pub fn input_lines(console: &Console) -> Vec<String> {
    console
        .lines()
        .into_iter()
        .filter(|line| line.kind == LineKind::Input)
        .map(|line| line.text)
        .collect()
}
