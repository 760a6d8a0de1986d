//! End-to-end session behavior over a memory surface.

mod support;

use console_panel::driver::{run_until_ended, DriverExit};
use console_panel::error::ConsoleError;
use console_panel::session::{
    ConsoleOptions, PanelEvent, PanelVariant, SessionState, DEFAULT_END_MESSAGE,
};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::stream::{self, StreamExt};
use std::io;
use std::time::Duration;
use support::*;

// ---------------------------------------------------------------------------
// Input round trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitted_line_round_trips() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let task = tokio::spawn({
        let console = console.clone();
        async move { console.input().await }
    });
    until_awaiting(&console).await;
    assert_eq!(editable_count(&console), 1);

    submit(&console, "hello world");

    let value = task.await.expect("join").expect("input");
    assert_eq!(value.as_deref(), Some("hello world"));
    assert_eq!(console.state(), SessionState::Idle);
    assert_eq!(editable_count(&console), 0);
    assert_eq!(input_lines(&console), vec!["hello world"]);
}

#[tokio::test]
async fn inputs_splits_on_whitespace() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let task = tokio::spawn({
        let console = console.clone();
        async move { console.inputs().await }
    });
    until_awaiting(&console).await;
    submit(&console, "  hello   world ");

    let tokens = task.await.expect("join").expect("inputs");
    assert_eq!(tokens, Some(vec!["hello".to_string(), "world".to_string()]));
}

#[tokio::test]
async fn empty_submission_yields_empty_string_and_one_empty_token() {
    let (console, _surface) = mounted(PanelVariant::Inline);

    let pending = console.begin_input().expect("begin").expect("accepted");
    press(&console, KeyCode::Enter);
    assert_eq!(pending.submitted().await.expect("submitted"), "");

    let task = tokio::spawn({
        let console = console.clone();
        async move { console.inputs().await }
    });
    until_awaiting(&console).await;
    press(&console, KeyCode::Enter);
    let tokens = task.await.expect("join").expect("inputs");
    assert_eq!(tokens, Some(vec![String::new()]));
}

#[tokio::test]
async fn non_breaking_spaces_are_normalized() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    let typed = "a\u{a0}b\u{a0}\u{a0}c";
    submit(&console, typed);

    let value = pending.submitted().await.expect("submitted");
    assert_eq!(value, "a b  c");
    assert_eq!(value.chars().count(), typed.chars().count());
}

#[tokio::test]
async fn typed_markup_is_kept_literal() {
    let (console, surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    submit(&console, "<b>x</b> & y");

    assert_eq!(pending.submitted().await.expect("submitted"), "<b>x</b> & y");
    assert_eq!(last_text(&console).as_deref(), Some("<b>x</b> & y"));
    assert_eq!(surface.visible_text(), vec!["<b>x</b> & y"]);
}

// ---------------------------------------------------------------------------
// Single pending input
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reentrant_input_is_rejected_without_a_second_line() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let first = console.begin_input().expect("begin");
    assert!(first.is_some());

    let second = console.begin_input().expect("re-entrant call is not an error");
    assert!(second.is_none());
    assert_eq!(console.input().await.expect("not an error"), None);

    assert_eq!(console.lines().len(), 1);
    assert_eq!(editable_count(&console), 1);
    assert_eq!(console.state(), SessionState::AwaitingInput);
}

#[tokio::test]
async fn demoted_line_stays_read_only() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    submit(&console, "done");
    pending.submitted().await.expect("submitted");

    console
        .dispatch(PanelEvent::FocusGained)
        .expect("focus gained");
    console.dispatch(PanelEvent::FocusLost).expect("focus lost");
    console
        .dispatch(PanelEvent::Click { column: 70, row: 0 })
        .expect("click");
    type_text(&console, "more");

    assert_eq!(editable_count(&console), 0);
    assert_eq!(texts(&console), vec!["done"]);

    let next = console.begin_input().expect("begin").expect("accepted");
    assert_eq!(editable_count(&console), 1);
    assert_eq!(next.line().index(), 1);
}

#[tokio::test]
async fn only_the_newest_line_is_ever_editable() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    for round in 0..3 {
        console.output([format!("prompt {round}")]).expect("output");
        let pending = console.begin_input().expect("begin").expect("accepted");
        assert_eq!(editable_count(&console), 1);
        submit(&console, &format!("answer {round}"));
        assert_eq!(
            pending.submitted().await.expect("submitted"),
            format!("answer {round}")
        );
        assert_eq!(editable_count(&console), 0);
    }
    assert_eq!(input_lines(&console), vec!["answer 0", "answer 1", "answer 2"]);
}

// ---------------------------------------------------------------------------
// Editing and focus
// ---------------------------------------------------------------------------

#[tokio::test]
async fn focus_loss_never_submits_and_refocus_moves_caret_to_end() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    type_text(&console, "ab");
    press(&console, KeyCode::Home);

    console.dispatch(PanelEvent::FocusLost).expect("blur");
    assert_eq!(console.state(), SessionState::AwaitingInput);

    type_text(&console, "c");
    press(&console, KeyCode::Enter);
    assert_eq!(pending.submitted().await.expect("submitted"), "abc");
}

#[tokio::test]
async fn clicking_the_panel_refocuses_at_the_end() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    type_text(&console, "xy");
    press(&console, KeyCode::Left);
    press(&console, KeyCode::Left);

    console
        .dispatch(PanelEvent::Click { column: 70, row: 3 })
        .expect("click");
    submit(&console, "z");
    assert_eq!(pending.submitted().await.expect("submitted"), "xyz");
}

#[tokio::test]
async fn cursor_keys_edit_in_place() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    type_text(&console, "helo");
    press(&console, KeyCode::Left);
    type_text(&console, "l");
    press(&console, KeyCode::Home);
    press(&console, KeyCode::Delete);
    type_text(&console, "H");
    press(&console, KeyCode::End);
    submit(&console, "!");
    assert_eq!(pending.submitted().await.expect("submitted"), "Hello!");
}

#[tokio::test]
async fn backspace_removes_pasted_break_artifact() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    console
        .dispatch(PanelEvent::Paste("\nab".into()))
        .expect("paste");
    press(&console, KeyCode::Backspace);
    press(&console, KeyCode::Backspace);
    assert_eq!(console.lines()[0].text, "", "leftover break removed");

    press(&console, KeyCode::Enter);
    assert_eq!(pending.submitted().await.expect("submitted"), "");
}

#[tokio::test]
async fn shift_enter_still_commits() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    type_text(&console, "one");
    console
        .dispatch(PanelEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::SHIFT,
        )))
        .expect("shift enter");
    assert_eq!(pending.submitted().await.expect("submitted"), "one");
}

// ---------------------------------------------------------------------------
// Ending
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_interrupts_a_pending_input() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let pending = console.begin_input().expect("begin").expect("accepted");
    type_text(&console, "half");

    console.end(Some("bye")).expect("end");

    assert!(matches!(pending.submitted().await, Err(ConsoleError::Ended)));
    assert_eq!(console.state(), SessionState::Ended);
    assert_eq!(editable_count(&console), 0);
    assert_eq!(texts(&console), vec!["half", "bye"]);
    assert!(matches!(console.input().await, Err(ConsoleError::Ended)));
}

#[tokio::test]
async fn remount_is_refused_while_input_pending() {
    let (console, _surface) = mounted(PanelVariant::Inline);
    let _pending = console.begin_input().expect("begin").expect("accepted");
    let other = console_panel::panel::MemorySurface::new(COLS, ROWS);
    assert!(matches!(
        console.mount(other),
        Err(ConsoleError::InputPending)
    ));
}

#[tokio::test]
async fn remount_replaces_the_surface_with_an_empty_panel() {
    let (console, first) = mounted(PanelVariant::Inline);
    console.output(["old"]).expect("output");
    let second = console_panel::panel::MemorySurface::new(COLS, ROWS);
    console.mount(second.clone()).expect("remount");

    assert!(!first.is_attached());
    assert!(second.is_attached());
    assert!(console.lines().is_empty());
    console.output(["new"]).expect("output");
    assert_eq!(second.visible_text(), vec!["new"]);
}

// ---------------------------------------------------------------------------
// Idle timer (app variant)
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn idle_app_session_ends_after_last_output() {
    let (console, surface) = mounted(PanelVariant::App);
    console.output(["done"]).expect("output");
    assert_eq!(console.state(), SessionState::Idle);

    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(console.state(), SessionState::Ended);
    assert_eq!(texts(&console), vec!["done", DEFAULT_END_MESSAGE]);
    assert_eq!(surface.visible_text(), vec!["done", DEFAULT_END_MESSAGE]);
}

#[tokio::test(start_paused = true)]
async fn mounting_an_app_arms_the_timer() {
    let (console, _surface) = mounted(PanelVariant::App);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(console.state(), SessionState::Ended);
}

#[tokio::test(start_paused = true)]
async fn pending_input_cancels_the_idle_timer() {
    let (console, _surface) = mounted(PanelVariant::App);
    console.output(["question?"]).expect("output");
    let pending = console.begin_input().expect("begin").expect("accepted");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(console.state(), SessionState::AwaitingInput);
    assert!(!texts(&console).iter().any(|t| t == DEFAULT_END_MESSAGE));

    submit(&console, "answer");
    assert_eq!(pending.submitted().await.expect("submitted"), "answer");

    // Commit re-arms the countdown.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(console.state(), SessionState::Ended);
}

#[tokio::test(start_paused = true)]
async fn each_output_restarts_the_countdown() {
    let options = ConsoleOptions {
        idle_delay: Duration::from_millis(100),
        ..ConsoleOptions::default()
    };
    let (console, _surface) = mounted_with(PanelVariant::App, options);

    console.output(["one"]).expect("output");
    tokio::time::sleep(Duration::from_millis(60)).await;
    console.output(["two"]).expect("output");
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(console.state(), SessionState::Idle, "second output reset the timer");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(console.state(), SessionState::Ended);
}

#[tokio::test(start_paused = true)]
async fn output_after_end_appends_without_ending_again() {
    let (console, _surface) = mounted(PanelVariant::App);
    console.output(["done"]).expect("output");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(console.state(), SessionState::Ended);

    console.output(["late"]).expect("output after end");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(last_text(&console).as_deref(), Some("late"));
    let end_lines = texts(&console)
        .iter()
        .filter(|t| t.as_str() == DEFAULT_END_MESSAGE)
        .count();
    assert_eq!(end_lines, 1);
}

#[tokio::test(start_paused = true)]
async fn custom_end_message_is_used_by_the_timer() {
    let options = ConsoleOptions {
        end_message: "Finished.".into(),
        ..ConsoleOptions::default()
    };
    let (console, _surface) = mounted_with(PanelVariant::App, options);
    console.output(["x"]).expect("output");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(last_text(&console).as_deref(), Some("Finished."));
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

fn key_event(code: KeyCode) -> io::Result<Event> {
    Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

#[tokio::test(start_paused = true)]
async fn driver_feeds_keys_until_the_app_goes_idle() {
    let (console, _surface) = mounted(PanelVariant::App);
    let host = tokio::spawn({
        let console = console.clone();
        async move {
            console.output(["name?"])?;
            let name = console.input().await?.unwrap_or_default();
            console.output([format!("hi {name}")])?;
            Ok::<_, ConsoleError>(())
        }
    });
    until_awaiting(&console).await;

    let typed = vec![
        key_event(KeyCode::Char('b')),
        key_event(KeyCode::Char('o')),
        key_event(KeyCode::Enter),
    ];
    let mut events = stream::iter(typed).chain(stream::pending());
    let exit = run_until_ended(&console, &mut events).await.expect("driver");

    assert_eq!(exit, DriverExit::Ended);
    host.await.expect("join").expect("host");
    assert_eq!(
        texts(&console),
        vec!["name?", "bo", "hi bo", DEFAULT_END_MESSAGE]
    );
}
