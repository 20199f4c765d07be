pub mod broadcast;
pub mod config;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod sanitize;
pub mod storage;
pub mod worker;

pub use broadcast::{BroadcastSink, JsonLinesSink};
pub use config::{load_settings, ProbeFailurePolicy, RunConfig, Settings};
pub use detector::{detect, find_card, CardBrand, CardMatch};
pub use error::{CardsiftError, ConfigError, JobError, Result, WorkerError};
pub use pipeline::{LogSink, NoopSink, Pipeline, PipelineConfig, PipelineError, ProgressSink};
pub use worker::{run_job, JobReport, OutcomeStatus, Scheduler, WorkUnit};
