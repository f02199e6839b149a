use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmcError {
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(u64),

    #[error("No exercise is managed at {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Invalid {kind} name: {value:?}")]
    InvalidName { kind: &'static str, value: String },

    #[error("Path {} already belongs to exercise {id}", path.display())]
    PathConflict { path: PathBuf, id: u64 },

    #[error("Download source {} is not a directory", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Workspace is locked by `tmcws {command}` (pid {pid})")]
    Locked { pid: u32, command: String },

    #[error("Unsupported state: {0}")]
    UnsupportedState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Watcher error: {0}")]
    Watcher(#[from] notify::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("Could not determine a data directory, set TMCWS_DATA to choose one")]
    NoDataDir,

    #[error("Store error: {0}")]
    Store(String),
}

impl TmcError {
    /// Lookup misses are recoverable and never signal corrupted state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ExerciseNotFound(_) | Self::PathNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TmcError>;
