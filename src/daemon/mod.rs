//! Daemon module for Disengage.
//!
//! This module contains the long-running part of the application:
//! - `scheduler`: break scheduling state machine and main loop
//! - `signal`: termination signal handling

pub mod scheduler;
pub mod signal;

pub use scheduler::{poll_once, BreakScheduler};
pub use signal::shutdown_signal;
