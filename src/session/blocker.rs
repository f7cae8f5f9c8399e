//! Screen blocking strategies.
//!
//! A break blocks interaction either by covering every display with overlay
//! windows or, where no window system is available, by locking the
//! workstation. Both run for exactly the same duration.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use super::error::SessionError;

/// Configured preference for how breaks block the screen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BlockingMode {
    /// Overlay when a window system is available, otherwise lock
    #[default]
    Auto,
    /// Always use overlay windows
    Overlay,
    /// Always lock the workstation
    Lock,
}

/// The strategy actually used for one break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingStrategy {
    /// Lock the workstation, then wait out the break
    LockScreen,
    /// Fullscreen blackout windows on every display
    OverlayBlackout,
}

impl BlockingStrategy {
    /// Picks a strategy from the configured mode and what the platform offers.
    ///
    /// With nothing available, `OverlayBlackout` is chosen: it degrades to an
    /// audio-only break instead of failing.
    #[must_use]
    pub fn select(mode: BlockingMode, windows_available: bool, lock_available: bool) -> Self {
        match mode {
            BlockingMode::Overlay => Self::OverlayBlackout,
            BlockingMode::Lock => Self::LockScreen,
            BlockingMode::Auto if windows_available => Self::OverlayBlackout,
            BlockingMode::Auto if lock_available => Self::LockScreen,
            BlockingMode::Auto => Self::OverlayBlackout,
        }
    }

    /// Returns the string representation of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockScreen => "lock_screen",
            Self::OverlayBlackout => "overlay_blackout",
        }
    }
}

/// How long a lock command may run before the session gives up on it.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Pending result of [`ScreenLocker::lock`].
pub type LockFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SessionError>> + Send + 'a>>;

/// Locks the workstation.
pub trait ScreenLocker: Send + Sync {
    /// Returns true if this platform has a lock command.
    fn is_available(&self) -> bool;

    /// Locks the screen once.
    ///
    /// Dropping the future abandons the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockFailed` if the command fails.
    fn lock(&self) -> LockFuture<'_>;
}

/// Runs `locker.lock()` for at most `limit`.
///
/// # Errors
///
/// The lock error, or `SessionError::LockFailed` on timeout.
pub async fn lock_within(locker: &dyn ScreenLocker, limit: Duration) -> Result<(), SessionError> {
    match tokio::time::timeout(limit, locker.lock()).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::LockFailed(format!(
            "no response within {}s",
            limit.as_secs()
        ))),
    }
}

/// Locks the screen through the platform's own command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLocker;

impl SystemLocker {
    /// Program and arguments for the current platform.
    #[must_use]
    pub fn command() -> Option<(&'static str, &'static [&'static str])> {
        if cfg!(target_os = "linux") {
            Some(("loginctl", &["lock-session"]))
        } else if cfg!(target_os = "windows") {
            Some(("rundll32.exe", &["user32.dll,LockWorkStation"]))
        } else if cfg!(target_os = "macos") {
            Some(("pmset", &["displaysleepnow"]))
        } else {
            None
        }
    }
}

impl ScreenLocker for SystemLocker {
    fn is_available(&self) -> bool {
        Self::command().is_some()
    }

    fn lock(&self) -> LockFuture<'_> {
        Box::pin(run_lock_command())
    }
}

/// Runs the platform lock command to completion.
async fn run_lock_command() -> Result<(), SessionError> {
    let (program, args) = SystemLocker::command()
        .ok_or_else(|| SessionError::LockFailed("unsupported platform".to_string()))?;

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SessionError::LockFailed(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SessionError::LockFailed(format!(
            "{}: {}",
            program,
            stderr.trim()
        )));
    }

    debug!("{} succeeded", program);
    Ok(())
}

/// Mock screen locker for testing.
#[derive(Debug, Clone, Default)]
pub struct MockScreenLocker {
    lock_calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    should_fail: Arc<AtomicBool>,
    hang: Arc<AtomicBool>,
}

impl MockScreenLocker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes `lock()` never complete, like a stalled session manager.
    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    #[must_use]
    pub fn lock_count(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }
}

impl ScreenLocker for MockScreenLocker {
    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn lock(&self) -> LockFuture<'_> {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        let hang = self.hang.load(Ordering::SeqCst);
        let fail = self.should_fail.load(Ordering::SeqCst);
        Box::pin(async move {
            if hang {
                std::future::pending::<()>().await;
            }
            if fail {
                return Err(SessionError::LockFailed("Mock failure".to_string()));
            }
            Ok(())
        })
    }
}
