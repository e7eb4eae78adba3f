use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("timer has already been started")]
    TimerAlreadyStarted,

    #[error("timer is not running")]
    TimerNotRunning,

    #[error("position ({row}, {col}) is outside of the {height}x{width} pad")]
    OutOfRange {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    #[error("quote source did not produce any usable text")]
    SourceExhausted,

    #[error("failed to read quote file '{}': {error}", .path.display())]
    ReadSource {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
