pub mod loader;
pub mod schema;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use loader::{load_settings, load_settings_from_str, validate_settings};
pub use schema::{ProbeFailurePolicy, Settings};

/// Everything a run needs: where to read, where to write, and how.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_directory: PathBuf,
    pub destination_directory: PathBuf,
    pub settings: Settings,
}

impl RunConfig {
    pub fn new<S: AsRef<Path>, D: AsRef<Path>>(
        source_directory: S,
        destination_directory: D,
        settings: Settings,
    ) -> Self {
        Self {
            source_directory: source_directory.as_ref().to_path_buf(),
            destination_directory: destination_directory.as_ref().to_path_buf(),
            settings,
        }
    }

    /// Checks the directories and settings before any file is touched.
    ///
    /// Whether the source holds at least one non-empty file is decided when the
    /// directory is partitioned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_settings(&self.settings)?;
        validate_dir(&self.source_directory, "Source directory")?;
        validate_dir(&self.destination_directory, "Destination directory")?;

        let source = canonical(&self.source_directory, "Source directory")?;
        let destination = canonical(&self.destination_directory, "Destination directory")?;
        if source == destination {
            return Err(ConfigError::SameDirectory(source));
        }

        Ok(())
    }
}

fn validate_dir(path: &Path, name: &'static str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            name,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn canonical(path: &Path, name: &'static str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|_| ConfigError::NotADirectory {
        name,
        path: path.to_path_buf(),
    })
}
