use crate::config::{ProbeFailurePolicy, Settings};

/// Per-file processing parameters shared by every work unit of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub probe_failure: ProbeFailurePolicy,
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            probe_failure: settings.probe_failure,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
