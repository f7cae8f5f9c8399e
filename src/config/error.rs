//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the configuration.
///
/// Unlike session errors, these are fatal: the process refuses to start
/// with a configuration it cannot honour.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("設定ファイルを読み込めません: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("設定ファイルの形式が不正です: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The values violate an invariant.
    #[error("設定値が不正です: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "ファイルの権限を確認してください",
            Self::Parse { .. } => "`disengage config --default` の出力を参考にしてください",
            Self::Invalid(_) => "間隔と長さの大小関係を確認してください",
        }
    }
}
