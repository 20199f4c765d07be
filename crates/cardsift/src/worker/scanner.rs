use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{ConfigError, Result, WorkerError};
use crate::storage::PathResolver;
use crate::worker::job::WorkUnit;

/// Splits a source directory into one work unit per non-empty file.
pub struct DirectoryScanner {
    input_directory: PathBuf,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    /// Lists the regular, non-empty files directly under the input directory, in file
    /// name order, each paired with its destination.
    ///
    /// Fails when no such file exists: a run with nothing to process is a configuration
    /// error, not an empty success.
    pub fn partition(&self, resolver: &PathResolver) -> Result<Vec<WorkUnit>> {
        let mut units = Vec::new();
        let mut destinations = HashSet::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1) // Only scan top level, not subdirectories
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(WorkerError::ScanFailed {
                        path: self.input_directory.clone(),
                        source: e,
                    }
                    .into());
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let len = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if len == 0 {
                debug!("Skipping empty file: {}", entry.path().display());
                continue;
            }

            let destination = resolver.destination_for(entry.path())?;
            if !destinations.insert(destination.clone()) {
                return Err(ConfigError::DuplicateDestination(destination).into());
            }

            debug!("Found file: {}", entry.path().display());
            units.push(WorkUnit::new(entry.path().to_path_buf(), destination));
        }

        if units.is_empty() {
            return Err(ConfigError::NoWorkUnits(self.input_directory.clone()).into());
        }

        info!(
            "Partitioned {} files in {}",
            units.len(),
            self.input_directory.display()
        );
        Ok(units)
    }
}
