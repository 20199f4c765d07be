use serde::{Deserialize, Serialize};

/// Tunables for a run, loadable from a JSON settings file.
///
/// Every field has a default, so `{}` is a complete settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Lines read, filtered and written together before progress is reported.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Files processed simultaneously. Derived from the CPU count when absent.
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Extra workers allowed above `parallelism` while the dispatch queue is full.
    #[serde(default = "default_burst_workers")]
    pub burst_workers: usize,
    /// How long an idle worker waits for another file before exiting.
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,
    #[serde(default)]
    pub probe_failure: ProbeFailurePolicy,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_burst_workers() -> usize {
    5
}

fn default_keep_alive_ms() -> u64 {
    2000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            parallelism: None,
            burst_workers: default_burst_workers(),
            keep_alive_ms: default_keep_alive_ms(),
            probe_failure: ProbeFailurePolicy::default(),
        }
    }
}

/// What to do when a file's total line count cannot be determined up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFailurePolicy {
    /// Keep processing the file; progress is reported without a total.
    #[default]
    Degrade,
    /// Fail the file before any output is written.
    Fail,
}
