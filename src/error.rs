use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("RAM snapshot must be {expected} bytes, got {actual}")]
    SnapshotSize { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum QTableError {
    #[error("State {0} is not in the Q-table")]
    UnknownState(String),

    #[error("Invalid state key: {0:?}")]
    InvalidStateKey(String),

    #[error("Entry {0} must hold exactly the action slots \"0\" and \"1\"")]
    MalformedEntry(String),

    #[error("Invalid action index: {0}")]
    InvalidAction(usize),

    #[error("Vision range {0} collides with the terminal sentinel")]
    VisionRange(u8),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QTableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QTableError::Io {
            path: path.into(),
            source,
        }
    }
}
