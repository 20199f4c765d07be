pub mod config;
pub mod error;
pub mod lines;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use lines::{count_lines, LineReader};
pub use progress::{
    ChunkResult, LogSink, NoopSink, ProgressEvent, ProgressPhase, ProgressSink, ProgressTracker,
};
pub use runner::Pipeline;
