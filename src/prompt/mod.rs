//! Break warning prompt.
//!
//! Before every break the user is shown a warning with a countdown and the
//! choice to start now or snooze. The prompt always returns within the
//! countdown (plus a small epsilon); no answer counts as "start now".

mod terminal;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

pub use terminal::TerminalPrompt;

use crate::types::{SnoozeOption, UserDecision};

/// Prompt title for the given break kind.
#[must_use]
pub fn prompt_title(is_long_break: bool) -> &'static str {
    if is_long_break {
        "Long Break Coming!"
    } else {
        "Short Break Time!"
    }
}

/// Shows the pre-break warning.
#[allow(async_fn_in_trait)]
pub trait Prompt {
    /// Shows the warning for `countdown` and returns the user's answer.
    async fn show(&mut self, countdown: Duration, is_long_break: bool) -> UserDecision;
}

/// Prompt for unattended runs: always starts the break immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPrompt;

impl Prompt for AutoPrompt {
    async fn show(&mut self, _countdown: Duration, is_long_break: bool) -> UserDecision {
        info!("{} Starting break now", prompt_title(is_long_break));
        UserDecision::chose(SnoozeOption::Now)
    }
}

/// Mock prompt for testing.
///
/// Answers from a script; once the script is exhausted every prompt times
/// out. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockPrompt {
    script: Arc<Mutex<VecDeque<UserDecision>>>,
    calls: Arc<Mutex<Vec<(Duration, bool, Instant)>>>,
}

impl MockPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer for the next prompt.
    pub fn push_decision(&self, decision: UserDecision) {
        self.script.lock().unwrap().push_back(decision);
    }

    /// Every prompt as (countdown, is_long_break, time shown).
    #[must_use]
    pub fn calls(&self) -> Vec<(Duration, bool, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Prompt for MockPrompt {
    async fn show(&mut self, countdown: Duration, is_long_break: bool) -> UserDecision {
        self.calls
            .lock()
            .unwrap()
            .push((countdown, is_long_break, Instant::now()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(UserDecision::timed_out)
    }
}
