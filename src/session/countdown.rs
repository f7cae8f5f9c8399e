//! Countdown label for a running break.
//!
//! Modelled as one repeating one-second task with an explicit remaining
//! count, rather than a callback that re-arms itself.

use std::time::Duration;

/// Remaining-time counter driven once per second by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTask {
    remaining_seconds: u64,
    cancelled: bool,
}

impl CountdownTask {
    /// Creates a countdown for `duration`, rounded up to whole seconds.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        let mut seconds = duration.as_secs();
        if duration.subsec_nanos() > 0 {
            seconds += 1;
        }
        Self {
            remaining_seconds: seconds,
            cancelled: false,
        }
    }

    /// Advances by one second.
    ///
    /// Returns true if the label changed and should be redrawn.
    pub fn tick(&mut self) -> bool {
        if self.cancelled || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        true
    }

    /// Stops the countdown; further ticks are ignored.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// The label shown on the primary window, e.g. `Break Time - 4:05`.
    #[must_use]
    pub fn label(&self) -> String {
        let (minutes, seconds) = format_time(self.remaining_seconds);
        format!("Break Time - {}:{:02}", minutes, seconds)
    }
}

/// Formats remaining seconds as (minutes, seconds).
#[must_use]
pub fn format_time(total_seconds: u64) -> (u64, u64) {
    (total_seconds / 60, total_seconds % 60)
}
