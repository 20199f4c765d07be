use std::fs::File;
use std::io::{BufReader, Write};
use std::sync::Arc;

use tracing::{debug, debug_span, info_span};

use crate::detector;
use crate::worker::job::{PipelineOutcome, WorkUnit};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::lines::LineReader;
use super::progress::{ChunkResult, ProgressSink, ProgressTracker};

/// Filters one source file into its destination, a chunk of lines at a time.
pub struct Pipeline {
    config: PipelineConfig,
    sink: Arc<dyn ProgressSink>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, sink: Arc<dyn ProgressSink>) -> Self {
        Self { config, sink }
    }

    /// Run the full pipeline for a single file.
    ///
    /// Every failure is folded into the returned outcome; both file handles are closed
    /// before this returns.
    pub fn run(&self, unit: WorkUnit) -> PipelineOutcome {
        let filename = unit.file_name();
        let _pipeline_span = info_span!("pipeline",
            unit_id = %unit.id,
            filename = %filename,
        )
        .entered();

        let mut tracker = ProgressTracker::new(Arc::clone(&self.sink), self.config.probe_failure);
        let mut counts = ChunkResult::default();

        if let Err(e) = tracker.on_step_start(&unit) {
            tracker.on_failed(&unit, &counts, &e);
            return PipelineOutcome::failure(unit, e, counts, None);
        }

        match self.filter_file(&unit, &tracker, &mut counts) {
            Ok(()) => {
                tracker.on_completed(&unit, &counts);
                PipelineOutcome::success(unit, counts, tracker.total_lines())
            }
            Err(e) => {
                tracker.on_failed(&unit, &counts, &e);
                PipelineOutcome::failure(unit, e, counts, tracker.total_lines())
            }
        }
    }

    /// `counts` only ever reflects chunks that were fully written.
    fn filter_file(
        &self,
        unit: &WorkUnit,
        tracker: &ProgressTracker,
        counts: &mut ChunkResult,
    ) -> Result<(), PipelineError> {
        let source = File::open(&unit.source_path).map_err(|e| PipelineError::OpenSource {
            path: unit.source_path.clone(),
            source: e,
        })?;
        let mut reader = LineReader::new(BufReader::new(source));

        let mut destination =
            File::create(&unit.destination_path).map_err(|e| PipelineError::CreateDestination {
                path: unit.destination_path.clone(),
                source: e,
            })?;

        let chunk_size = self.config.chunk_size.max(1);
        let mut line = String::new();
        let mut matched = String::new();
        let mut chunk_index = 0u64;

        loop {
            let _chunk_span = debug_span!("chunk", index = chunk_index).entered();
            let mut read_in_chunk = 0u64;
            let mut written_in_chunk = 0u64;
            let mut exhausted = false;
            matched.clear();

            while read_in_chunk < chunk_size as u64 {
                let more = reader
                    .read_line(&mut line)
                    .map_err(|e| PipelineError::Read {
                        path: unit.source_path.clone(),
                        line: counts.lines_read + read_in_chunk + 1,
                        source: e,
                    })?;
                if !more {
                    exhausted = true;
                    break;
                }
                read_in_chunk += 1;

                if detector::detect(&line) {
                    matched.push_str(&line);
                    matched.push('\n');
                    written_in_chunk += 1;
                }
            }

            if read_in_chunk > 0 {
                destination
                    .write_all(matched.as_bytes())
                    .and_then(|()| destination.flush())
                    .map_err(|e| PipelineError::Write {
                        path: unit.destination_path.clone(),
                        source: e,
                    })?;

                counts.lines_read += read_in_chunk;
                counts.lines_written += written_in_chunk;
                debug!(
                    read = read_in_chunk,
                    written = written_in_chunk,
                    "chunk committed"
                );
                tracker.on_chunk(unit, counts);
            }

            if exhausted {
                break;
            }
            chunk_index += 1;
        }

        Ok(())
    }
}
