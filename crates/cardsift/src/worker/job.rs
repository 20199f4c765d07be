use std::path::PathBuf;

use crate::error::{ConfigError, JobError};
use crate::pipeline::{ChunkResult, PipelineError};
use crate::sanitize;

/// One source file paired with the file its matching lines go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub id: String,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
}

impl WorkUnit {
    pub fn new(source_path: PathBuf, destination_path: PathBuf) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            destination_path,
        }
    }

    /// File name of the source, safe for logs and span fields.
    pub fn file_name(&self) -> String {
        sanitize::redact_path(&self.source_path)
    }
}

/// The set of work units for one run, with the knobs shared by all of them.
#[derive(Debug, Clone)]
pub struct Job {
    work_units: Vec<WorkUnit>,
    chunk_size: usize,
    parallelism: usize,
}

impl Job {
    pub fn new(
        work_units: Vec<WorkUnit>,
        chunk_size: usize,
        parallelism: usize,
    ) -> Result<Self, ConfigError> {
        if work_units.is_empty() {
            return Err(ConfigError::Validation {
                message: "A job needs at least one file to process.".to_string(),
            });
        }
        if chunk_size == 0 {
            return Err(ConfigError::Validation {
                message: "Chunk size must be greater than 0.".to_string(),
            });
        }
        if parallelism == 0 {
            return Err(ConfigError::Validation {
                message: "Parallelism must be greater than 0.".to_string(),
            });
        }

        Ok(Self {
            work_units,
            chunk_size,
            parallelism,
        })
    }

    pub fn work_units(&self) -> &[WorkUnit] {
        &self.work_units
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn into_work_units(self) -> Vec<WorkUnit> {
        self.work_units
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// How a single work unit ended.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub unit: WorkUnit,
    pub status: OutcomeStatus,
    pub error: Option<PipelineError>,
    pub lines_read: u64,
    pub lines_written: u64,
    pub total_lines: Option<u64>,
}

impl PipelineOutcome {
    pub fn success(unit: WorkUnit, counts: ChunkResult, total_lines: Option<u64>) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Success,
            error: None,
            lines_read: counts.lines_read,
            lines_written: counts.lines_written,
            total_lines,
        }
    }

    pub fn failure(
        unit: WorkUnit,
        error: PipelineError,
        counts: ChunkResult,
        total_lines: Option<u64>,
    ) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Failure,
            error: Some(error),
            lines_read: counts.lines_read,
            lines_written: counts.lines_written,
            total_lines,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregated outcomes of every work unit in a job.
#[derive(Debug, Default)]
pub struct JobReport {
    pub outcomes: Vec<PipelineOutcome>,
}

impl JobReport {
    pub fn new(outcomes: Vec<PipelineOutcome>) -> Self {
        Self { outcomes }
    }

    /// `Success` only when every unit succeeded.
    pub fn status(&self) -> OutcomeStatus {
        if self.outcomes.iter().all(PipelineOutcome::is_success) {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::Failure
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &PipelineOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PipelineOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn lines_read(&self) -> u64 {
        self.outcomes.iter().map(|o| o.lines_read).sum()
    }

    pub fn lines_written(&self) -> u64 {
        self.outcomes.iter().map(|o| o.lines_written).sum()
    }

    pub fn into_result(self) -> Result<Self, JobError> {
        let failed = self.failed().count();
        if failed > 0 {
            return Err(JobError::UnitsFailed {
                failed,
                total: self.outcomes.len(),
            });
        }
        Ok(self)
    }
}
