//! Session controller: the output/input state machine behind a console.
//!
//! A [`Console`] owns one mounted [`TextPanel`], the idle timer and at most
//! one pending input. Hosts print with [`Console::output`], ask for a line
//! with [`Console::input`], and feed terminal events through
//! [`Console::dispatch`] (usually via [`crate::driver::run_until_ended`]).

mod edit;
mod event;
mod timer;
mod variant;

pub use edit::{normalize_nbsp, split_tokens};
pub use event::PanelEvent;
pub use variant::{PanelVariant, Subscription};

use crate::error::ConsoleError;
use crate::panel::style::DEFAULT_INLINE_WIDTH_PERCENT;
use crate::panel::{HitTarget, LineHandle, LineSnapshot, PanelRoot, Surface, TextPanel};
use crossterm::event::KeyEventKind;
use edit::{EditSession, KeyOutcome};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use timer::IdleTimer;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, trace, warn};

/// Delay before an idle app session ends on its own.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(10);
pub const DEFAULT_END_MESSAGE: &str = "The program has ended....";
/// Rows moved per wheel notch.
const SCROLL_STEP: usize = 3;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingInput,
    /// Terminal; a new session needs a new console.
    Ended,
}

/// Tunables for one console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub idle_delay: Duration,
    pub end_message: String,
    pub inline_width_percent: u16,
    pub start_collapsed: bool,
    pub color: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            idle_delay: DEFAULT_IDLE_DELAY,
            end_message: DEFAULT_END_MESSAGE.to_string(),
            inline_width_percent: DEFAULT_INLINE_WIDTH_PERCENT,
            start_collapsed: false,
            color: true,
        }
    }
}

/// Input request that has been placed on the panel but not yet submitted.
#[derive(Debug)]
#[must_use = "the submitted text is only delivered through `submitted()`"]
pub struct PendingInput {
    line: LineHandle,
    completion: oneshot::Receiver<String>,
}

impl PendingInput {
    /// The editable line this input types into.
    pub fn line(&self) -> LineHandle {
        self.line
    }

    /// Wait for the user to commit the line.
    ///
    /// Resolves with [`ConsoleError::Ended`] when the session ends (or the
    /// panel is unmounted) before anything was submitted.
    pub async fn submitted(self) -> Result<String, ConsoleError> {
        self.completion.await.map_err(|_| ConsoleError::Ended)
    }
}

struct Shared {
    variant: PanelVariant,
    options: ConsoleOptions,
    panel: Option<TextPanel>,
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    timer: IdleTimer,
    subscriptions: Vec<Subscription>,
    edit: Option<EditSession>,
    this: Weak<Mutex<Shared>>,
}

impl Shared {
    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            trace!(from = ?self.state, to = ?state, "session state change");
        }
        self.state = state;
        self.state_tx.send_replace(state);
    }

    fn subscribed(&self, subscription: Subscription) -> bool {
        self.subscriptions.contains(&subscription)
    }

    /// Restart the idle countdown; only ever runs while idle.
    fn arm_timer(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        let this = self.this.clone();
        self.timer
            .arm(move |generation| on_idle_timeout(&this, generation));
    }

    fn render(&mut self) -> Result<(), ConsoleError> {
        match self.panel.as_mut() {
            Some(panel) => Ok(panel.render()?),
            None => Ok(()),
        }
    }

    fn end(&mut self, message: &str) -> Result<(), ConsoleError> {
        let panel = self.panel.as_mut().ok_or(ConsoleError::NotMounted)?;
        if self.edit.take().is_some() {
            // Dropping the session drops its sender; the waiting caller sees Ended.
            panel.set_editable(None);
            debug!("pending input abandoned by end");
        }
        panel.append_line(message);
        self.timer.disable();
        if self.state != SessionState::Ended {
            info!("console session ended");
        }
        self.set_state(SessionState::Ended);
        self.render()
    }

    fn commit_input(&mut self) -> Result<(), ConsoleError> {
        let Some(mut session) = self.edit.take() else {
            return Ok(());
        };
        let panel = self.panel.as_mut().ok_or(ConsoleError::NotMounted)?;
        let raw = panel.text(session.target().handle()).unwrap_or_default();
        panel.set_editable(None);
        self.set_state(SessionState::Idle);
        self.arm_timer();
        debug!(chars = raw.chars().count(), "input submitted");
        session.resolve(normalize_nbsp(&raw));
        self.render()
    }

    /// Undo a half-started input (render failed before the caller got it).
    fn abandon_input(&mut self) {
        self.edit = None;
        if let Some(panel) = self.panel.as_mut() {
            panel.set_editable(None);
        }
        self.set_state(SessionState::Idle);
        self.arm_timer();
    }
}

fn on_idle_timeout(this: &Weak<Mutex<Shared>>, generation: u64) {
    let Some(shared) = this.upgrade() else {
        return;
    };
    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
    if !shared.timer.take_fired(generation) {
        trace!(generation, "stale idle timer wake-up ignored");
        return;
    }
    if shared.state != SessionState::Idle {
        return;
    }
    debug!("idle timeout reached; ending session");
    let message = shared.options.end_message.clone();
    if let Err(err) = shared.end(&message) {
        warn!(error = %err, "failed to end idle session");
    }
}

/// Handle to one console session. Clones share the same session.
#[derive(Clone)]
pub struct Console {
    shared: Arc<Mutex<Shared>>,
}

impl Console {
    pub fn new(variant: PanelVariant) -> Self {
        Self::with_options(variant, ConsoleOptions::default())
    }

    pub fn with_options(variant: PanelVariant, options: ConsoleOptions) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let timer = IdleTimer::new(options.idle_delay, variant.auto_finish());
        let shared = Arc::new_cyclic(|this| {
            Mutex::new(Shared {
                variant,
                options,
                panel: None,
                state: SessionState::Idle,
                state_tx,
                timer,
                subscriptions: Vec::new(),
                edit: None,
                this: this.clone(),
            })
        });
        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn variant(&self) -> PanelVariant {
        self.lock().variant
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.lock().state_tx.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().panel.is_some()
    }

    pub fn is_collapsed(&self) -> bool {
        self.lock()
            .panel
            .as_ref()
            .is_some_and(TextPanel::is_collapsed)
    }

    /// Snapshot of every line; empty when unmounted.
    pub fn lines(&self) -> Vec<LineSnapshot> {
        self.lock()
            .panel
            .as_ref()
            .map(TextPanel::snapshot)
            .unwrap_or_default()
    }

    /// Mount a fresh panel onto `surface`, replacing any previous mount.
    ///
    /// The app variant starts its idle countdown here, so a host that never
    /// prints still ends.
    pub fn mount<S>(&self, surface: S) -> Result<PanelRoot, ConsoleError>
    where
        S: Surface + 'static,
    {
        let mut guard = self.lock();
        let shared = &mut *guard;
        if shared.state == SessionState::AwaitingInput {
            return Err(ConsoleError::InputPending);
        }
        if let Some(mut previous) = shared.panel.take() {
            debug!("remounting console; previous panel discarded");
            if let Err(err) = previous.unmount() {
                warn!(error = %err, "failed to detach previous panel");
            }
        }

        let preset = shared
            .variant
            .preset(Some(shared.options.inline_width_percent))
            .with_color(shared.options.color);
        let mut panel = TextPanel::new(preset).with_collapsed(shared.options.start_collapsed);
        let root = panel.mount(Box::new(surface))?;
        shared.panel = Some(panel);
        shared.subscriptions = shared.variant.subscriptions();
        info!(variant = %shared.variant, "console mounted");

        if shared.variant.auto_finish() {
            shared.arm_timer();
        }
        Ok(root)
    }

    /// Detach the surface and tear the session down.
    ///
    /// Subscriptions are disposed and the session ends without a message; a
    /// pending input resolves with [`ConsoleError::Ended`].
    pub fn unmount(&self) -> Result<(), ConsoleError> {
        let mut guard = self.lock();
        let shared = &mut *guard;
        shared.subscriptions.clear();
        shared.timer.disable();
        if shared.edit.take().is_some() {
            debug!("pending input dropped by unmount");
        }
        shared.set_state(SessionState::Ended);
        match shared.panel.take() {
            Some(mut panel) => Ok(panel.unmount()?),
            None => Ok(()),
        }
    }

    /// Append one line per message, then restart the idle countdown.
    ///
    /// Messages are markup; run untrusted text through
    /// [`crate::panel::markup::escape`] first.
    pub fn output<I, S>(&self, messages: I) -> Result<(), ConsoleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.lock();
        let shared = &mut *guard;
        let panel = shared.panel.as_mut().ok_or(ConsoleError::NotMounted)?;
        let mut count = 0usize;
        for message in messages {
            panel.append_line(message.as_ref());
            count += 1;
        }
        trace!(count, "output appended");
        shared.arm_timer();
        shared.render()
    }

    /// Append the end message and end the session for good.
    ///
    /// `None` uses the configured end message. Calling again appends the
    /// message again.
    pub fn end(&self, message: Option<&str>) -> Result<(), ConsoleError> {
        let mut guard = self.lock();
        let message = match message {
            Some(message) => message.to_string(),
            None => guard.options.end_message.clone(),
        };
        guard.end(&message)
    }

    /// Place an editable line and return a handle to its eventual value.
    ///
    /// Returns `Ok(None)` when an input is already pending; the request is
    /// rejected rather than queued.
    pub fn begin_input(&self) -> Result<Option<PendingInput>, ConsoleError> {
        let mut guard = self.lock();
        let shared = &mut *guard;
        let panel = shared.panel.as_mut().ok_or(ConsoleError::NotMounted)?;
        match shared.state {
            SessionState::Ended => return Err(ConsoleError::Ended),
            SessionState::AwaitingInput => {
                debug!("input already pending; rejecting re-entrant request");
                return Ok(None);
            }
            SessionState::Idle => {}
        }

        let target = panel.append_editable_line();
        panel.focus_editable();
        shared.timer.cancel();
        let (tx, rx) = oneshot::channel();
        shared.edit = Some(EditSession::new(target, tx));
        shared.set_state(SessionState::AwaitingInput);
        debug!(line = target.handle().index(), "awaiting input");

        if let Err(err) = shared.render() {
            shared.abandon_input();
            return Err(err);
        }
        Ok(Some(PendingInput {
            line: target.handle(),
            completion: rx,
        }))
    }

    /// Ask for one line of input.
    ///
    /// `Ok(None)` means another input is already pending.
    pub async fn input(&self) -> Result<Option<String>, ConsoleError> {
        match self.begin_input()? {
            Some(pending) => pending.submitted().await.map(Some),
            None => Ok(None),
        }
    }

    /// Ask for one line and split it into whitespace-separated tokens.
    ///
    /// A blank line yields `[""]`.
    pub async fn inputs(&self) -> Result<Option<Vec<String>>, ConsoleError> {
        Ok(self
            .input()
            .await?
            .map(|text| split_tokens(text.trim())))
    }

    /// Route one host event through the installed subscriptions.
    pub fn dispatch(&self, event: PanelEvent) -> Result<(), ConsoleError> {
        let mut guard = self.lock();
        let shared = &mut *guard;
        let global_key_refocus = shared.subscribed(Subscription::GlobalKeyRefocus);
        let panel_click_refocus = shared.subscribed(Subscription::PanelClickRefocus);
        let collapse_toggle = shared.subscribed(Subscription::CollapseToggle);
        let panel = shared.panel.as_mut().ok_or(ConsoleError::NotMounted)?;
        let mut commit = false;

        match event {
            PanelEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    return Ok(());
                }
                if global_key_refocus && panel.focus_editable() {
                    trace!("key press refocused the editable line");
                }
                if let Some(session) = shared.edit.as_mut() {
                    commit = session.handle_key(panel, &key) == KeyOutcome::Commit;
                }
            }
            PanelEvent::Paste(text) => {
                if let Some(session) = shared.edit.as_mut() {
                    panel.focus_editable();
                    session.paste(panel, &text);
                }
            }
            PanelEvent::FocusLost => {
                if shared.edit.is_some() {
                    panel.blur_editable();
                    // Losing focus never submits; take it straight back.
                    panel.focus_editable();
                    trace!("editable line refocused after blur");
                }
            }
            PanelEvent::FocusGained => {
                if shared.edit.is_some() {
                    panel.focus_editable();
                }
            }
            PanelEvent::Click { column, row } => {
                let hit = panel.hit_test(column, row)?;
                if hit == HitTarget::Toggle && collapse_toggle {
                    panel.toggle_collapsed();
                }
                if hit == HitTarget::Panel && panel_click_refocus && shared.edit.is_some() {
                    // A click is a fresh focus: the caret returns to the end.
                    panel.blur_editable();
                    panel.focus_editable();
                    trace!("panel click refocused the editable line");
                }
            }
            PanelEvent::ScrollUp => panel.scroll_up(SCROLL_STEP),
            PanelEvent::ScrollDown => panel.scroll_down(SCROLL_STEP),
            PanelEvent::Resize { cols, rows } => {
                trace!(cols, rows, "surface resized");
            }
        }

        if commit {
            return shared.commit_input();
        }
        shared.render()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.lock();
        f.debug_struct("Console")
            .field("variant", &shared.variant)
            .field("state", &shared.state)
            .field("mounted", &shared.panel.is_some())
            .finish()
    }
}
