pub mod job;
pub mod pool;
pub mod scanner;
pub mod scheduler;

pub use job::{Job, JobReport, OutcomeStatus, PipelineOutcome, WorkUnit};
pub use pool::{default_parallelism, resolve_parallelism, PoolConfig, WorkerPool};
pub use scanner::DirectoryScanner;
pub use scheduler::{run_job, Scheduler};
