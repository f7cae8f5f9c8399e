//! Enforcement session error types.
//!
//! None of these are fatal. A session logs them and keeps the break running
//! for its full duration.

use thiserror::Error;

/// Errors raised by the window system, display enumeration or screen lock.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No window system is available in this build or environment.
    #[error("ウィンドウシステムが利用できません")]
    WindowSystemUnavailable,

    /// A blackout window could not be created on a display.
    #[error("ディスプレイ '{display}' にウィンドウを作成できません: {reason}")]
    WindowCreation { display: String, reason: String },

    /// A window could not be updated (label text).
    #[error("ウィンドウの更新に失敗しました: {0}")]
    WindowUpdate(String),

    /// A window failed to close.
    #[error("ウィンドウを閉じられません: {0}")]
    WindowTeardown(String),

    /// Monitor enumeration failed.
    #[error("ディスプレイの列挙に失敗しました: {0}")]
    DisplayEnumeration(String),

    /// The platform screen lock command failed.
    #[error("画面ロックに失敗しました: {0}")]
    LockFailed(String),
}

impl SessionError {
    /// Returns true if this error concerns a single window rather than the
    /// whole window system.
    #[must_use]
    pub fn is_window_error(&self) -> bool {
        matches!(
            self,
            Self::WindowCreation { .. } | Self::WindowUpdate(_) | Self::WindowTeardown(_)
        )
    }
}
