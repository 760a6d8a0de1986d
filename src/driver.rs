//! Event pump between a terminal event stream and a [`Console`].

use crate::error::ConsoleError;
use crate::session::{Console, PanelEvent, SessionState};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use std::io;
use tracing::{debug, info};

/// Line appended when the user interrupts with Ctrl+C.
pub const INTERRUPT_MESSAGE: &str = "Interrupted.";

/// Why [`run_until_ended`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The session ended (host call or idle timeout).
    Ended,
    /// Ctrl+C; the session was ended with [`INTERRUPT_MESSAGE`].
    Interrupted,
    /// The event stream finished first.
    EventsClosed,
}

/// Dispatch events into `console` until its session ends.
///
/// Raw mode swallows SIGINT, so Ctrl+C is handled here as an explicit end.
pub async fn run_until_ended<S>(console: &Console, events: &mut S) -> Result<DriverExit, ConsoleError>
where
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let mut state = console.watch_state();
    loop {
        if *state.borrow_and_update() == SessionState::Ended {
            return Ok(DriverExit::Ended);
        }
        tokio::select! {
            biased;

            changed = state.changed() => {
                if changed.is_err() {
                    return Ok(DriverExit::Ended);
                }
            }
            next = events.next() => {
                let Some(event) = next else {
                    debug!("event stream closed");
                    return Ok(DriverExit::EventsClosed);
                };
                let event = event?;
                if is_interrupt(&event) {
                    info!("interrupted by user");
                    console.end(Some(INTERRUPT_MESSAGE))?;
                    return Ok(DriverExit::Interrupted);
                }
                if let Some(event) = PanelEvent::from_terminal(event) {
                    console.dispatch(event)?;
                }
            }
        }
    }
}

/// Wait for the next key press, so a finished panel stays readable.
pub async fn wait_for_key<S>(events: &mut S) -> Result<Option<KeyEvent>, ConsoleError>
where
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    while let Some(event) = events.next().await {
        if let Event::Key(key) = event? {
            if key.kind != KeyEventKind::Release {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}

fn is_interrupt(event: &Event) -> bool {
    let Event::Key(key) = event else {
        return false;
    };
    key.kind != KeyEventKind::Release
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c' | 'C'))
}
