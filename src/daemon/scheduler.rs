//! Break scheduler.
//!
//! This module provides the top-level break loop:
//! - `poll_once`: pure due / skip decision from the timer state
//! - `BreakScheduler`: prompt, optional snooze, enforcement, timer update
//!
//! The loop has no terminal state; it ends only when the surrounding task is
//! cancelled.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::prompt::Prompt;
use crate::session::BreakEnforcer;
use crate::types::{BreakEvent, BreakKind, BreakProfile, TimerDelta, TimerState};

// ============================================================================
// Decision
// ============================================================================

/// Decides which break, if any, is due at `now`.
///
/// A long break always wins. A due short break is skipped when the long
/// break is at most `skip_threshold` away. Time readings earlier than a
/// timestamp count as zero elapsed.
pub fn poll_once(now: Instant, state: &TimerState, profile: &BreakProfile) -> BreakEvent {
    let elapsed_short = now.saturating_duration_since(state.last_short);
    let elapsed_long = now.saturating_duration_since(state.last_long);

    let long_due = profile.due_after(BreakKind::Long);
    if elapsed_long >= long_due {
        return BreakEvent::Due {
            kind: BreakKind::Long,
            due_at: state.last_long + long_due,
        };
    }

    let short_due = profile.due_after(BreakKind::Short);
    if elapsed_short >= short_due {
        let time_until_long = profile.long_interval.saturating_sub(elapsed_long);
        if time_until_long <= profile.skip_threshold {
            return BreakEvent::Skipped { time_until_long };
        }
        return BreakEvent::Due {
            kind: BreakKind::Short,
            due_at: state.last_short + short_due,
        };
    }

    BreakEvent::NotDue {
        short_in: short_due - elapsed_short,
        long_in: long_due - elapsed_long,
    }
}

fn minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}

// ============================================================================
// BreakScheduler
// ============================================================================

/// Owns the timer state and drives prompt and enforcement.
pub struct BreakScheduler<P, E> {
    profile: BreakProfile,
    state: TimerState,
    prompt: P,
    enforcer: E,
}

impl<P: Prompt, E: BreakEnforcer> BreakScheduler<P, E> {
    /// Creates a scheduler whose timers both start now.
    pub fn new(profile: BreakProfile, prompt: P, enforcer: E) -> Self {
        Self {
            profile,
            state: TimerState::new(Instant::now()),
            prompt,
            enforcer,
        }
    }

    /// Runs the scheduler loop forever.
    pub async fn run(&mut self) {
        info!(
            "Scheduler started: short break every {} min, long break every {} min",
            minutes(self.profile.short_interval),
            minutes(self.profile.long_interval)
        );

        loop {
            let event = self.tick().await;
            if !event.is_due() {
                sleep(self.profile.poll_interval).await;
            }
        }
    }

    /// Performs one scheduler iteration.
    ///
    /// Polls the clock and, if a break is due, runs it to completion and
    /// updates the timers. Returns the event that was acted on.
    pub async fn tick(&mut self) -> BreakEvent {
        let event = poll_once(Instant::now(), &self.state, &self.profile);

        match event {
            BreakEvent::Due { kind, .. } => {
                info!("{} break due", kind);
                let delta = self.run_break(kind).await;
                self.state.apply(delta);
            }
            BreakEvent::Skipped { time_until_long } => {
                info!(
                    "Skipping short break, long break in {} min",
                    minutes(time_until_long)
                );
            }
            BreakEvent::NotDue { short_in, long_in } => {
                debug!(
                    "Short break in {} min, long break in {} min",
                    minutes(short_in),
                    minutes(long_in)
                );
            }
        }

        event
    }

    /// Prompts, honours any snooze, then enforces a break of `kind`.
    ///
    /// No other break is evaluated while snoozing.
    pub async fn run_break(&mut self, kind: BreakKind) -> TimerDelta {
        let decision = self
            .prompt
            .show(self.profile.prompt_countdown, kind.is_long())
            .await;

        if !decision.acknowledged {
            info!("No answer to the break prompt, starting now");
        }
        if let Some(snooze) = decision.snooze() {
            info!("{} break snoozed for {} min", kind, minutes(snooze));
            sleep(snooze).await;
        }

        let report = self
            .enforcer
            .enforce(kind, self.profile.duration(kind))
            .await;
        let completed_at = Instant::now();
        info!(
            "{} break completed ({} window(s), {}s)",
            kind,
            report.windows_opened,
            report.elapsed.as_secs()
        );

        TimerDelta { kind, completed_at }
    }

    #[must_use]
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
