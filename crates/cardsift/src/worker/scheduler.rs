use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::config::{ProbeFailurePolicy, RunConfig, Settings};
use crate::error::{JobError, Result};
use crate::pipeline::{Pipeline, PipelineConfig, ProgressSink};
use crate::storage::PathResolver;
use crate::worker::job::{Job, JobReport};
use crate::worker::pool::{resolve_parallelism, PoolConfig, WorkerPool};
use crate::worker::scanner::DirectoryScanner;

/// Runs every work unit of a job on a fresh worker pool and collects the outcomes.
pub struct Scheduler {
    burst_workers: usize,
    keep_alive: Duration,
    probe_failure: ProbeFailurePolicy,
    sink: Arc<dyn ProgressSink>,
}

impl Scheduler {
    pub fn new(settings: &Settings, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            burst_workers: settings.burst_workers,
            keep_alive: Duration::from_millis(settings.keep_alive_ms),
            probe_failure: settings.probe_failure,
            sink,
        }
    }

    /// Dispatches every unit and waits for all of them.
    ///
    /// A failed unit never stops its siblings; the report's status reflects whether any
    /// failed. Only pool-level problems (a worker thread that cannot be spawned) are
    /// returned as errors.
    pub fn execute(&self, job: Job) -> Result<JobReport> {
        let pipeline = Arc::new(Pipeline::new(
            PipelineConfig {
                chunk_size: job.chunk_size(),
                probe_failure: self.probe_failure,
            },
            Arc::clone(&self.sink),
        ));
        let pool = WorkerPool::new(
            pipeline,
            PoolConfig::new(job.parallelism(), self.burst_workers, self.keep_alive),
        );

        let expected = job.work_units().len();
        for unit in job.into_work_units() {
            pool.submit(unit)?;
        }

        let outcomes = pool.finish();
        if outcomes.len() < expected {
            return Err(JobError::MissingOutcomes {
                missing: expected - outcomes.len(),
            }
            .into());
        }

        let report = JobReport::new(outcomes);
        for outcome in report.failed() {
            if let Some(ref e) = outcome.error {
                warn!("{} failed: {}", outcome.unit.file_name(), e);
            }
        }
        info!(
            "Job finished: {} of {} files succeeded, {} lines read, {} lines kept",
            report.succeeded().count(),
            report.outcomes.len(),
            report.lines_read(),
            report.lines_written()
        );

        Ok(report)
    }
}

/// Validates the configuration, partitions the source directory and executes the job.
///
/// Configuration problems are returned before any worker starts or any file is written.
pub fn run_job(config: &RunConfig, sink: Arc<dyn ProgressSink>) -> Result<JobReport> {
    config.validate()?;

    let resolver = PathResolver::new(&config.destination_directory);
    let units = DirectoryScanner::new(&config.source_directory).partition(&resolver)?;

    let parallelism = resolve_parallelism(config.settings.parallelism);
    info!(
        "Requested parallelism degree: {:?}, resulting degree: {}",
        config.settings.parallelism, parallelism
    );

    let job = Job::new(units, config.settings.chunk_size, parallelism)?;
    Scheduler::new(&config.settings, sink).execute(job)
}
