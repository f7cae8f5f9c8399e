//! Disengage Library
//!
//! This library provides the core functionality for the Disengage break
//! enforcer. It includes:
//! - Break scheduler with short/long arbitration and the skip rule
//! - Enforcement sessions: blackout windows or screen lock, countdown, teardown
//! - Audio watchdog with looped playback and restart on interruption
//! - Pre-break prompt with snooze options
//! - JSON configuration
//! - CLI command parsing and display utilities
//! - Native overlay windows (`gui` feature)

pub mod cli;
pub mod config;
pub mod daemon;
pub mod gui;
pub mod prompt;
pub mod session;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    BreakEvent, BreakKind, BreakProfile, SelectionMode, SnoozeOption, TimerDelta, TimerState,
    UserDecision,
};

pub use config::{AppConfig, ConfigError};

pub use daemon::{poll_once, shutdown_signal, BreakScheduler};

pub use prompt::{AutoPrompt, MockPrompt, Prompt, TerminalPrompt};

// Re-export session types
pub use session::{
    BlockingMode, BlockingStrategy, BreakEnforcer, DisplayEnumerator, DisplayInfo,
    EnforcementSession, Enforcer, MockEnforcer, MockScreenLocker, MockWindowSystem,
    NoWindowSystem, ScreenLocker, SessionBackends, SessionError, SessionReport, StaticDisplays,
    SystemLocker, WindowSystem,
};

// Re-export sound types
pub use sound::{
    try_acquire_audio, AudioBackend, AudioHandle, AudioOutput, AudioSubsystem, MockAudioBackend,
    RodioAudioBackend, Rotation, SilentOutput, SoundError, WatchdogReport,
};
