use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::ProbeFailurePolicy;
use crate::worker::job::WorkUnit;

use super::error::PipelineError;
use super::lines::count_lines;

/// Cumulative line counters for one file, updated after every chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResult {
    pub lines_read: u64,
    pub lines_written: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Started,
    Chunk,
    Completed,
    Failed,
}

impl std::fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressPhase::Started => write!(f, "Started"),
            ProgressPhase::Chunk => write!(f, "Chunk"),
            ProgressPhase::Completed => write!(f, "Completed"),
            ProgressPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// One observation of a file's progress, as delivered to a [`ProgressSink`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub unit_id: String,
    pub file_name: String,
    pub phase: ProgressPhase,
    pub lines_read: u64,
    pub lines_written: u64,
    /// `None` when the line count probe failed.
    pub total_lines: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    fn new(unit: &WorkUnit, phase: ProgressPhase, counts: ChunkResult, total: Option<u64>) -> Self {
        Self {
            unit_id: unit.id.clone(),
            file_name: unit.file_name(),
            phase,
            lines_read: counts.lines_read,
            lines_written: counts.lines_written,
            total_lines: total,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn started(unit: &WorkUnit, total: Option<u64>) -> Self {
        Self::new(unit, ProgressPhase::Started, ChunkResult::default(), total)
    }

    pub fn chunk(unit: &WorkUnit, counts: ChunkResult, total: Option<u64>) -> Self {
        Self::new(unit, ProgressPhase::Chunk, counts, total)
    }

    pub fn completed(unit: &WorkUnit, counts: ChunkResult, total: Option<u64>) -> Self {
        Self::new(unit, ProgressPhase::Completed, counts, total)
    }

    pub fn failed(unit: &WorkUnit, counts: ChunkResult, total: Option<u64>, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(unit, ProgressPhase::Failed, counts, total)
        }
    }
}

/// Receives progress events from every worker concurrently.
///
/// Reporting is fire-and-forget: a sink cannot influence processing.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes progress as log records.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, event: ProgressEvent) {
        let total = event
            .total_lines
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match event.phase {
            ProgressPhase::Started => {
                debug!("{}: started, {} lines to process.", event.file_name, total);
            }
            ProgressPhase::Chunk => {
                info!(
                    "{}: {} out of {} lines processed.",
                    event.file_name, event.lines_read, total
                );
            }
            ProgressPhase::Completed => {
                info!(
                    "{}: completed, {} of {} lines kept.",
                    event.file_name, event.lines_written, event.lines_read
                );
            }
            ProgressPhase::Failed => {
                error!(
                    "{}: failed after {} lines: {}",
                    event.file_name,
                    event.lines_read,
                    event.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

/// Tracks one file's progress and forwards it to the shared sink.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    policy: ProbeFailurePolicy,
    total_lines: Option<u64>,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>, policy: ProbeFailurePolicy) -> Self {
        Self {
            sink,
            policy,
            total_lines: None,
        }
    }

    pub fn total_lines(&self) -> Option<u64> {
        self.total_lines
    }

    /// Counts the source file's lines before the first chunk.
    pub fn on_step_start(&mut self, unit: &WorkUnit) -> Result<(), PipelineError> {
        self.on_step_start_with(unit, count_lines)
    }

    /// Like [`on_step_start`](Self::on_step_start) with a caller-supplied line counter.
    pub fn on_step_start_with<F>(&mut self, unit: &WorkUnit, probe: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&Path) -> std::io::Result<u64>,
    {
        match probe(&unit.source_path) {
            Ok(total) => {
                self.total_lines = Some(total);
            }
            Err(e) => {
                self.total_lines = None;
                let err = PipelineError::LineCountProbe {
                    path: unit.source_path.clone(),
                    source: e,
                };
                if self.policy == ProbeFailurePolicy::Fail {
                    return Err(err);
                }
                warn!("{} - progress will be reported without a total.", err);
            }
        }

        self.sink.report(ProgressEvent::started(unit, self.total_lines));
        Ok(())
    }

    pub fn on_chunk(&self, unit: &WorkUnit, counts: &ChunkResult) {
        self.sink.report(ProgressEvent::chunk(unit, *counts, self.total_lines));
    }

    pub fn on_completed(&self, unit: &WorkUnit, counts: &ChunkResult) {
        self.sink.report(ProgressEvent::completed(unit, *counts, self.total_lines));
    }

    pub fn on_failed(&self, unit: &WorkUnit, counts: &ChunkResult, error: &PipelineError) {
        self.sink.report(ProgressEvent::failed(
            unit,
            *counts,
            self.total_lines,
            &error.to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn unit() -> WorkUnit {
        WorkUnit::new(
            PathBuf::from("/in/cards.csv"),
            PathBuf::from("/out/cards.csv"),
        )
    }

    fn failing_probe(_: &Path) -> std::io::Result<u64> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "probe failed"))
    }





    #[test]
    fn test_step_start_records_total() {
        let sink = Arc::new(RecordingSink::default());
        let mut tracker = ProgressTracker::new(sink.clone(), ProbeFailurePolicy::Degrade);
        let unit = unit();

        tracker.on_step_start_with(&unit, |_| Ok(42)).unwrap();
        tracker.on_chunk(
            &unit,
            &ChunkResult {
                lines_read: 10,
                lines_written: 1,
            },
        );

        assert_eq!(tracker.total_lines(), Some(42));
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].phase, ProgressPhase::Started);
        assert_eq!(events[1].phase, ProgressPhase::Chunk);
        assert_eq!(events[1].lines_read, 10);
        assert_eq!(events[1].total_lines, Some(42));
        assert_eq!(events[1].file_name, "cards.csv");
    }

    #[test]
    fn test_probe_failure_degrades_by_default() {
        let sink = Arc::new(RecordingSink::default());
        let mut tracker = ProgressTracker::new(sink.clone(), ProbeFailurePolicy::Degrade);
        let unit = unit();

        assert!(tracker.on_step_start_with(&unit, failing_probe).is_ok());
        tracker.on_chunk(&unit, &ChunkResult::default());

        assert_eq!(tracker.total_lines(), None);
        let events = sink.events.lock().unwrap();
        assert!(events.iter().all(|e| e.total_lines.is_none()));
    }

    #[test]
    fn test_probe_failure_escalates_under_fail_policy() {
        let sink = Arc::new(RecordingSink::default());
        let mut tracker = ProgressTracker::new(sink.clone(), ProbeFailurePolicy::Fail);

        let result = tracker.on_step_start_with(&unit(), failing_probe);

        assert!(matches!(result, Err(PipelineError::LineCountProbe { .. })));
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_event_carries_error() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = ProgressTracker::new(sink.clone(), ProbeFailurePolicy::Degrade);
        let err = PipelineError::Panicked("boom".to_string());

        tracker.on_failed(&unit(), &ChunkResult::default(), &err);

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0].phase, ProgressPhase::Failed);
        assert_eq!(events[0].error.as_deref(), Some("Pipeline panicked: boom"));
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = ProgressEvent::chunk(
            &unit(),
            ChunkResult {
                lines_read: 5,
                lines_written: 2,
            },
            None,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["fileName"], "cards.csv");
        assert_eq!(json["phase"], "chunk");
        assert_eq!(json["linesRead"], 5);
        assert!(json["totalLines"].is_null());
        assert!(json.get("error").is_none());
    }
}
