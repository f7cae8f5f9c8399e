//! Break music errors.
//!
//! None of these ever fail a break: the watchdog logs them and the blackout
//! continues in silence.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// No audio output could be opened.
    #[error("オーディオ出力を開けません: {0}")]
    NoOutputDevice(String),

    #[error("音楽ファイルを開けません: {} ({reason})", path.display())]
    MusicNotFound { path: PathBuf, reason: String },

    #[error("対応していない音楽ファイルです: {} ({reason})", path.display())]
    UnsupportedTrack { path: PathBuf, reason: String },

    /// The output stream refused a new sink or the sink broke mid-break.
    #[error("オーディオ出力エラー: {0}")]
    Sink(String),

    #[error("再生する曲が読み込まれていません")]
    NoTrackLoaded,
}

impl SoundError {
    /// True when retrying the same track within this break cannot help.
    #[must_use]
    pub fn is_track_error(&self) -> bool {
        matches!(
            self,
            Self::MusicNotFound { .. } | Self::UnsupportedTrack { .. } | Self::NoTrackLoaded
        )
    }

    /// Returns a hint shown next to the error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoOutputDevice(_) => "スピーカーまたはヘッドホンを接続してください",
            Self::MusicNotFound { .. } => "music_files のパスを確認してください",
            Self::UnsupportedTrack { .. } => "mp3 / wav / ogg / flac のファイルを指定してください",
            Self::Sink(_) => "OS のサウンド設定を確認してください",
            Self::NoTrackLoaded => "music_files を設定してください",
        }
    }
}
