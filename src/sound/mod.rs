//! Break music for enforcement sessions.
//!
//! This module provides:
//!
//! - The [`AudioBackend`] contract (load / play / is_playing / stop)
//! - A rodio implementation backed by a process-wide [`AudioSubsystem`]
//! - The audio watchdog that keeps music looping for a whole break
//! - [`Rotation`], the sequential / random picker for play-lists
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  handle()  ┌──────────────────┐
//! │  AudioSubsystem  │───────────▶│   AudioHandle    │ (Send, Clone)
//! │  (main thread)   │            └────────┬─────────┘
//! └──────────────────┘                     │ open() per session
//!                                          ▼
//!                                 ┌──────────────────┐
//!                                 │ RodioAudioBackend│◀── watchdog task
//!                                 └──────────────────┘
//! ```
//!
//! Every backend call is individually fallible. Callers log failures and
//! carry on; nothing in here is allowed to shorten a break.

mod error;
mod player;
mod rotation;
mod watchdog;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use error::SoundError;
pub use player::{try_acquire_audio, AudioHandle, AudioSubsystem, RodioAudioBackend};
pub use rotation::Rotation;
pub use watchdog::{run_watchdog, spawn_watchdog, WatchdogReport, WATCHDOG_POLL};

/// Playback of a single track.
pub trait AudioBackend: Send {
    /// Loads the track at `path`.
    ///
    /// # Errors
    ///
    /// `MusicNotFound` or `UnsupportedTrack`.
    fn load(&mut self, path: &Path) -> Result<(), SoundError>;

    /// Starts (or restarts) playback of the loaded track.
    fn play(&mut self, looped: bool) -> Result<(), SoundError>;

    /// Returns true while the track is audibly playing.
    fn is_playing(&self) -> Result<bool, SoundError>;

    /// Stops playback.
    fn stop(&mut self) -> Result<(), SoundError>;
}

/// Source of per-session audio backends.
pub trait AudioOutput: Send + Sync {
    /// Opens a fresh backend for one session.
    ///
    /// # Errors
    ///
    /// Returns an error if no output device is available.
    fn open(&self) -> Result<Box<dyn AudioBackend>, SoundError>;
}

/// Output used when the audio device could not be acquired at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn open(&self) -> Result<Box<dyn AudioBackend>, SoundError> {
        Err(SoundError::NoOutputDevice(
            "audio subsystem not initialized".to_string(),
        ))
    }
}

/// Mock audio backend for testing.
///
/// Clones share state, so a test can keep one copy and hand another to the
/// session under test.
#[derive(Debug, Clone, Default)]
pub struct MockAudioBackend {
    state: Arc<MockAudioState>,
}

#[derive(Debug, Default)]
struct MockAudioState {
    loads: Mutex<Vec<PathBuf>>,
    play_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    playing: AtomicBool,
    device_unavailable: AtomicBool,
    should_fail_load: AtomicBool,
    should_fail_play: AtomicBool,
    should_fail_all: AtomicBool,
}

impl MockAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_device_available(&self, available: bool) {
        self.state
            .device_unavailable
            .store(!available, Ordering::SeqCst);
    }

    pub fn set_should_fail_load(&self, should_fail: bool) {
        self.state.should_fail_load.store(should_fail, Ordering::SeqCst);
    }

    pub fn set_should_fail_play(&self, should_fail: bool) {
        self.state.should_fail_play.store(should_fail, Ordering::SeqCst);
    }

    /// Makes every backend call fail.
    pub fn set_should_fail_all(&self, should_fail: bool) {
        self.state.should_fail_all.store(should_fail, Ordering::SeqCst);
    }

    /// Simulates the device dropping playback.
    pub fn interrupt_playback(&self) {
        self.state.playing.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.state.loads.lock().unwrap().clone()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.state.play_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.state.stop_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_currently_playing(&self) -> bool {
        self.state.playing.load(Ordering::SeqCst)
    }

    fn fail_all(&self) -> bool {
        self.state.should_fail_all.load(Ordering::SeqCst)
    }
}

impl AudioBackend for MockAudioBackend {
    fn load(&mut self, path: &Path) -> Result<(), SoundError> {
        if self.fail_all() || self.state.should_fail_load.load(Ordering::SeqCst) {
            return Err(SoundError::MusicNotFound {
                path: path.to_path_buf(),
                reason: "Mock failure".to_string(),
            });
        }
        self.state.loads.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, _looped: bool) -> Result<(), SoundError> {
        self.state.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all() || self.state.should_fail_play.load(Ordering::SeqCst) {
            return Err(SoundError::Sink("Mock failure".to_string()));
        }
        self.state.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> Result<bool, SoundError> {
        if self.fail_all() {
            return Err(SoundError::Sink("Mock failure".to_string()));
        }
        Ok(self.state.playing.load(Ordering::SeqCst))
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all() {
            return Err(SoundError::Sink("Mock failure".to_string()));
        }
        self.state.playing.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl AudioOutput for MockAudioBackend {
    fn open(&self) -> Result<Box<dyn AudioBackend>, SoundError> {
        if self.state.device_unavailable.load(Ordering::SeqCst) {
            return Err(SoundError::NoOutputDevice("Mock device".to_string()));
        }
        Ok(Box::new(self.clone()))
    }
}
