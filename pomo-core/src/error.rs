use std::path::PathBuf;
use thiserror::Error;

/// Problems with a line typed at the prompt.
///
/// The display text is exactly what the prompt's error line shows.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid command")]
    InvalidCommand,

    #[error("Invalid minute")]
    InvalidMinute,

    #[error("Invalid date format")]
    InvalidDate,
}

/// Failures reading or writing the session log.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session record at {path}:{line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}
