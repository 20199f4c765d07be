//! Test harness for isolated end-to-end runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use assert_fs::TempDir;

use cardsift::pipeline::{ProgressEvent, ProgressSink};
use cardsift::{run_job, JobReport, NoopSink, RunConfig, Settings};

pub const VISA: &str = "4111111111111111";
pub const MASTERCARD: &str = "5555555555554444";

/// Collects every progress event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, file_name: &str) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.file_name == file_name)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Builds `count` lines mixing card and non-card content, with `seed` varying which
/// lines match.
pub fn sample_file(seed: usize, count: usize) -> String {
    let mut content = String::new();
    for i in 0..count {
        let line = match (i + seed) % 5 {
            0 => format!("{},order-{}", VISA, i),
            1 => format!("order-{},{},EUR", i, MASTERCARD),
            2 => format!("order-{},4111111111111112", i),
            3 => format!("41111111111111111,order-{}", i),
            _ => format!("no card on line {}", i),
        };
        content.push_str(&line);
        content.push('\n');
    }
    content
}

/// Isolated source and destination directories for one test.
pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: ChildPath,
    pub output_dir: ChildPath,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.child("input");
        let output_dir = temp_dir.child("output");
        input_dir.create_dir_all().expect("Failed to create input dir");
        output_dir.create_dir_all().expect("Failed to create output dir");

        Self {
            temp_dir,
            input_dir,
            output_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates an additional, empty destination directory.
    pub fn extra_output(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.child(name);
        dir.create_dir_all().expect("Failed to create output dir");
        dir.path().to_path_buf()
    }

    pub fn write_input(&self, filename: &str, content: &str) -> PathBuf {
        let file = self.input_dir.child(filename);
        file.write_str(content).expect("Failed to write input file");
        file.path().to_path_buf()
    }

    pub fn write_input_bytes(&self, filename: &str, content: &[u8]) -> PathBuf {
        let file = self.input_dir.child(filename);
        file.write_binary(content)
            .expect("Failed to write input file");
        file.path().to_path_buf()
    }

    pub fn settings(parallelism: usize, chunk_size: usize) -> Settings {
        Settings {
            parallelism: Some(parallelism),
            chunk_size,
            keep_alive_ms: 200,
            ..Settings::default()
        }
    }

    pub fn run(&self, settings: Settings) -> cardsift::Result<JobReport> {
        self.run_into(self.output_dir.path(), settings)
    }

    pub fn run_into(&self, destination: &Path, settings: Settings) -> cardsift::Result<JobReport> {
        let config = RunConfig::new(self.input_dir.path(), destination, settings);
        run_job(&config, Arc::new(NoopSink))
    }

    pub fn run_recording(
        &self,
        settings: Settings,
    ) -> (cardsift::Result<JobReport>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let config = RunConfig::new(self.input_dir.path(), self.output_dir.path(), settings);
        let result = run_job(&config, Arc::clone(&sink) as Arc<dyn ProgressSink>);
        (result, sink)
    }

    pub fn read_output(&self, filename: &str) -> String {
        std::fs::read_to_string(self.output_dir.path().join(filename))
            .expect("Failed to read output file")
    }

    /// Every file in `dir` with its bytes, sorted by name.
    pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
        let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
            .expect("Failed to list directory")
            .map(|entry| {
                let entry = entry.unwrap();
                (
                    entry.file_name().to_string_lossy().into_owned(),
                    std::fs::read(entry.path()).unwrap(),
                )
            })
            .collect();
        files.sort();
        files
    }

    pub fn output_snapshot(&self) -> Vec<(String, Vec<u8>)> {
        Self::snapshot(self.output_dir.path())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
