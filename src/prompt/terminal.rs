//! Terminal prompt.
//!
//! Stdin is read by one long-lived thread that forwards lines over a
//! crossbeam channel. Each prompt waits on that channel a second at a time
//! so the countdown can be redrawn between reads.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use super::{prompt_title, Prompt};
use crate::types::{SnoozeOption, UserDecision};

/// Redraw period of the countdown line.
const REDRAW: Duration = Duration::from_secs(1);

/// Prompt that asks on the terminal.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    input: Receiver<String>,
}

impl TerminalPrompt {
    /// Starts the stdin reader thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn new() -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            debug!("stdin closed: {}", e);
                            break;
                        }
                    }
                }
            })?;
        Ok(Self::from_receiver(rx))
    }

    /// Builds a prompt that reads answers from `input`.
    #[must_use]
    pub fn from_receiver(input: Receiver<String>) -> Self {
        Self { input }
    }

    fn print_header(is_long_break: bool) {
        let options: Vec<&str> = SnoozeOption::ALL.iter().map(|o| o.label()).collect();
        println!();
        println!("=== {} ===", prompt_title(is_long_break));
        println!("Enter ok, 15, 30 or 60 (minutes to snooze) [{}]", options.join(" / "));
    }

    fn print_countdown(seconds: u64) {
        print!("\rTime to be healthy again in {:>3} seconds ", seconds);
        let _ = io::stdout().flush();
    }
}

impl Prompt for TerminalPrompt {
    async fn show(&mut self, countdown: Duration, is_long_break: bool) -> UserDecision {
        // Answers typed before the prompt appeared are stale.
        while self.input.try_recv().is_ok() {}

        Self::print_header(is_long_break);
        let deadline = std::time::Instant::now() + countdown;

        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                println!();
                return UserDecision::timed_out();
            }
            Self::print_countdown(remaining.as_secs_f64().ceil() as u64);

            let input = self.input.clone();
            let wait = remaining.min(REDRAW);
            let received =
                tokio::task::spawn_blocking(move || input.recv_timeout(wait)).await;

            match received {
                Ok(Ok(line)) => match SnoozeOption::parse(&line) {
                    Some(option) => {
                        println!();
                        return UserDecision::chose(option);
                    }
                    None => println!("\nUnknown answer '{}'", line.trim()),
                },
                Ok(Err(RecvTimeoutError::Timeout)) => {}
                Ok(Err(RecvTimeoutError::Disconnected)) => {
                    debug!("No terminal input available, waiting out the prompt");
                    tokio::time::sleep(remaining).await;
                    println!();
                    return UserDecision::timed_out();
                }
                Err(e) => {
                    warn!("Prompt input task failed: {}", e);
                    return UserDecision::timed_out();
                }
            }
        }
    }
}
