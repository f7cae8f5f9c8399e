//! Core data types for Disengage.
//!
//! This module defines the data structures used for:
//! - Break kinds and the immutable break profile
//! - Scheduler timer state and the per-poll break event
//! - The user's answer to the break prompt

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

// ============================================================================
// BreakKind
// ============================================================================

/// The two kinds of enforced break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Frequent, short break
    Short,
    /// Rare, long break
    Long,
}

impl BreakKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::Short => "short",
            BreakKind::Long => "long",
        }
    }

    /// Returns true for a long break.
    pub fn is_long(&self) -> bool {
        matches!(self, BreakKind::Long)
    }
}

impl std::fmt::Display for BreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SelectionMode
// ============================================================================

/// How an item is picked from a configured list (music files, messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionMode {
    /// Cycle through the list in order, one item per break
    Sequential,
    /// Pick uniformly at random each break
    #[default]
    Random,
}

// ============================================================================
// BreakProfile
// ============================================================================

/// Upper bound for any single break, prompt or poll period.
pub const MAX_BREAK_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound for the break intervals.
pub const MAX_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Immutable scheduling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakProfile {
    /// Time between short breaks
    pub short_interval: Duration,
    /// Length of a short break
    pub short_duration: Duration,
    /// Time between long breaks
    pub long_interval: Duration,
    /// Length of a long break
    pub long_duration: Duration,
    /// A short break is skipped when a long one is at most this far away
    pub skip_threshold: Duration,
    /// Scheduler poll cadence
    pub poll_interval: Duration,
    /// How long before the nominal break time the user is prompted
    pub warning_lead: Duration,
    /// Countdown shown by the prompt
    pub prompt_countdown: Duration,
}

impl Default for BreakProfile {
    fn default() -> Self {
        Self {
            short_interval: Duration::from_secs(60 * 60),
            short_duration: Duration::from_secs(2 * 60),
            long_interval: Duration::from_secs(3 * 60 * 60),
            long_duration: Duration::from_secs(5 * 60),
            skip_threshold: Duration::from_secs(25 * 60),
            poll_interval: Duration::from_secs(60),
            warning_lead: Duration::from_secs(60),
            prompt_countdown: Duration::from_secs(60),
        }
    }
}

impl BreakProfile {
    /// Returns the interval for the given kind.
    pub fn interval(&self, kind: BreakKind) -> Duration {
        match kind {
            BreakKind::Short => self.short_interval,
            BreakKind::Long => self.long_interval,
        }
    }

    /// Returns the enforced duration for the given kind.
    pub fn duration(&self, kind: BreakKind) -> Duration {
        match kind {
            BreakKind::Short => self.short_duration,
            BreakKind::Long => self.long_duration,
        }
    }

    /// Elapsed time at which a break of this kind becomes due.
    pub fn due_after(&self, kind: BreakKind) -> Duration {
        self.interval(kind).saturating_sub(self.warning_lead)
    }

    /// Validates the profile.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        let non_zero = [
            ("short_interval", self.short_interval),
            ("short_duration", self.short_duration),
            ("long_interval", self.long_interval),
            ("long_duration", self.long_duration),
            ("poll_interval", self.poll_interval),
            ("warning_lead", self.warning_lead),
            ("prompt_countdown", self.prompt_countdown),
        ];
        for (name, value) in non_zero {
            if value.is_zero() {
                return Err(format!("{} は0より大きい値を指定してください", name));
            }
        }

        for (name, value) in [
            ("short_interval", self.short_interval),
            ("long_interval", self.long_interval),
        ] {
            if value > MAX_INTERVAL {
                return Err(format!(
                    "{} は {} 秒以下にしてください",
                    name,
                    MAX_INTERVAL.as_secs()
                ));
            }
        }
        for (name, value) in [
            ("short_duration", self.short_duration),
            ("long_duration", self.long_duration),
            ("poll_interval", self.poll_interval),
            ("prompt_countdown", self.prompt_countdown),
        ] {
            if value > MAX_BREAK_DURATION {
                return Err(format!(
                    "{} は {} 秒以下にしてください",
                    name,
                    MAX_BREAK_DURATION.as_secs()
                ));
            }
        }
        if self.short_interval >= self.long_interval {
            return Err("短い休憩の間隔は長い休憩の間隔より短くしてください".to_string());
        }
        if self.skip_threshold >= self.long_interval {
            return Err("スキップ閾値は長い休憩の間隔より短くしてください".to_string());
        }
        if self.short_duration >= self.short_interval {
            return Err("短い休憩の長さは短い休憩の間隔より短くしてください".to_string());
        }
        if self.warning_lead >= self.short_interval {
            return Err("予告時間は短い休憩の間隔より短くしてください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Timestamps of the last completed breaks.
///
/// Owned by the scheduler; nothing else mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Completion time of the last short (or long) break
    pub last_short: Instant,
    /// Completion time of the last long break
    pub last_long: Instant,
}

impl TimerState {
    /// Creates a state where both timers start at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            last_short: now,
            last_long: now,
        }
    }

    /// Applies the outcome of a completed enforcement.
    ///
    /// A long break resets both timers; a short break only its own.
    pub fn apply(&mut self, delta: TimerDelta) {
        match delta.kind {
            BreakKind::Long => {
                self.last_long = delta.completed_at;
                self.last_short = delta.completed_at;
            }
            BreakKind::Short => {
                self.last_short = delta.completed_at;
            }
        }
    }
}

/// Timer update produced by running one break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDelta {
    /// Kind of break that was enforced
    pub kind: BreakKind,
    /// When the enforcement finished
    pub completed_at: Instant,
}

// ============================================================================
// BreakEvent
// ============================================================================

/// Result of one scheduler poll. Recomputed every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEvent {
    /// A break is due now
    Due {
        /// Which break
        kind: BreakKind,
        /// When it became due
        due_at: Instant,
    },
    /// A short break is due but a long break is too close
    Skipped {
        /// Remaining time before the long break's nominal time
        time_until_long: Duration,
    },
    /// Nothing is due yet
    NotDue {
        /// Time until the short break becomes due
        short_in: Duration,
        /// Time until the long break becomes due
        long_in: Duration,
    },
}

impl BreakEvent {
    /// Returns the due break kind, or `None` when skipped or not due.
    pub fn kind(&self) -> Option<BreakKind> {
        match self {
            BreakEvent::Due { kind, .. } => Some(*kind),
            BreakEvent::Skipped { .. } | BreakEvent::NotDue { .. } => None,
        }
    }

    /// Returns true if a break should run now.
    pub fn is_due(&self) -> bool {
        self.kind().is_some()
    }
}

// ============================================================================
// UserDecision
// ============================================================================

/// The fixed set of answers the prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOption {
    /// Proceed now
    Now,
    /// Snooze 15 minutes
    FifteenMinutes,
    /// Snooze 30 minutes
    ThirtyMinutes,
    /// Snooze 60 minutes
    SixtyMinutes,
}

impl SnoozeOption {
    /// All options, in the order they are presented.
    pub const ALL: [SnoozeOption; 4] = [
        SnoozeOption::Now,
        SnoozeOption::FifteenMinutes,
        SnoozeOption::ThirtyMinutes,
        SnoozeOption::SixtyMinutes,
    ];

    /// Snooze length in seconds (0 for `Now`).
    pub fn seconds(&self) -> u64 {
        match self {
            SnoozeOption::Now => 0,
            SnoozeOption::FifteenMinutes => 15 * 60,
            SnoozeOption::ThirtyMinutes => 30 * 60,
            SnoozeOption::SixtyMinutes => 60 * 60,
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            SnoozeOption::Now => "OK",
            SnoozeOption::FifteenMinutes => "15 min",
            SnoozeOption::ThirtyMinutes => "30 min",
            SnoozeOption::SixtyMinutes => "60 min",
        }
    }

    /// Parses a typed answer: `ok`, `0`, `15`, `30` or `60`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "ok" | "0" => Some(SnoozeOption::Now),
            "15" => Some(SnoozeOption::FifteenMinutes),
            "30" => Some(SnoozeOption::ThirtyMinutes),
            "60" => Some(SnoozeOption::SixtyMinutes),
            _ => None,
        }
    }
}

/// The user's answer to the break prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserDecision {
    /// Whether a button was pressed before the countdown expired
    pub acknowledged: bool,
    /// Requested snooze in seconds (0 = proceed now)
    pub snooze_seconds: u64,
}

impl UserDecision {
    /// The countdown expired without an answer.
    pub fn timed_out() -> Self {
        Self {
            acknowledged: false,
            snooze_seconds: 0,
        }
    }

    /// The user picked one of the offered options.
    pub fn chose(option: SnoozeOption) -> Self {
        Self {
            acknowledged: true,
            snooze_seconds: option.seconds(),
        }
    }

    /// Returns the snooze to honour before enforcing, if any.
    ///
    /// A timeout or a zero snooze both mean "enforce immediately".
    pub fn snooze(&self) -> Option<Duration> {
        if self.acknowledged && self.snooze_seconds > 0 {
            Some(Duration::from_secs(self.snooze_seconds))
        } else {
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
