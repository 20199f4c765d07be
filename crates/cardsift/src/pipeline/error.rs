use std::path::PathBuf;

use thiserror::Error;

/// Failures confined to a single work unit.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to open source file '{path}': {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create destination file '{path}': {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read line {line} of '{path}': {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to count lines in '{path}': {source}")]
    LineCountProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline panicked: {0}")]
    Panicked(String),
}
