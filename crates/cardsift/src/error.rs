use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardsiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),
}

impl CardsiftError {
    /// Process exit status: 1 when the run was rejected before any work started,
    /// 2 when work started and some of it failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            CardsiftError::Config(_) => 1,
            CardsiftError::Worker(WorkerError::ScanFailed { .. }) => 1,
            CardsiftError::Worker(_) | CardsiftError::Job(_) => 2,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },

    #[error("{name} must be an existing and accessible directory: '{path}'")]
    NotADirectory { name: &'static str, path: PathBuf },

    #[error("Source and destination directories must differ: '{0}'")]
    SameDirectory(PathBuf),

    #[error("Source directory must contain at least one accessible non-empty file: '{0}'")]
    NoWorkUnits(PathBuf),

    #[error("Cannot derive a destination file name from '{0}'")]
    InvalidSourcePath(PathBuf),

    #[error("Destination '{0}' would be written by more than one source file")]
    DuplicateDestination(PathBuf),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error("{failed} of {total} files failed")]
    UnitsFailed { failed: usize, total: usize },

    #[error("Job lost {missing} outcomes; workers exited before reporting")]
    MissingOutcomes { missing: usize },
}

pub type Result<T> = std::result::Result<T, CardsiftError>;
