//! Idle auto-finish timer.
//!
//! Armed after every output or submitted input in the app variant; if the
//! host neither prints nor asks for input before it fires, the session ends.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

pub(crate) struct IdleTimer {
    delay: Duration,
    enabled: bool,
    /// Bumped on every arm so a late wake-up from an aborted task is ignored.
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl IdleTimer {
    pub(crate) fn new(delay: Duration, enabled: bool) -> Self {
        Self {
            delay,
            enabled,
            generation: 0,
            task: None,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// (Re)start the countdown; `on_fire` receives the arm generation.
    pub(crate) fn arm<F>(&mut self, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        if !self.enabled {
            return;
        }
        self.cancel();
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available; idle timer not armed");
            return;
        };
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let delay = self.delay;
        trace!(generation, delay_ms = delay.as_millis() as u64, "idle timer armed");
        self.task = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(generation);
        }));
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Cancel and never arm again.
    pub(crate) fn disable(&mut self) {
        self.cancel();
        self.enabled = false;
    }

    /// Claim a wake-up: true only for the live arm's generation.
    pub(crate) fn take_fired(&mut self, generation: u64) -> bool {
        if self.task.is_none() || self.generation != generation {
            return false;
        }
        self.task = None;
        true
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
