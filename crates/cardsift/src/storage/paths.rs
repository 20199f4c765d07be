use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Maps source files onto same-named files in the destination directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    destination_directory: PathBuf,
}

impl PathResolver {
    pub fn new<P: AsRef<Path>>(destination_directory: P) -> Self {
        Self {
            destination_directory: destination_directory.as_ref().to_path_buf(),
        }
    }

    /// Returns `<destination_directory>/<file name of source>`.
    pub fn destination_for(&self, source: &Path) -> Result<PathBuf, ConfigError> {
        let file_name = source
            .file_name()
            .ok_or_else(|| ConfigError::InvalidSourcePath(source.to_path_buf()))?;
        Ok(self.destination_directory.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_file_name() {
        let resolver = PathResolver::new("/data/out");
        let dest = resolver
            .destination_for(Path::new("/data/in/cards.csv"))
            .unwrap();
        assert_eq!(dest, PathBuf::from("/data/out/cards.csv"));
    }

    #[test]
    fn test_file_without_extension() {
        let resolver = PathResolver::new("out");
        let dest = resolver.destination_for(Path::new("in/README")).unwrap();
        assert_eq!(dest, PathBuf::from("out/README"));
    }

    #[test]
    fn test_path_without_file_name_rejected() {
        let resolver = PathResolver::new("/data/out");
        assert!(matches!(
            resolver.destination_for(Path::new("/")),
            Err(ConfigError::InvalidSourcePath(_))
        ));
        assert!(matches!(
            resolver.destination_for(Path::new("in/..")),
            Err(ConfigError::InvalidSourcePath(_))
        ));
    }
}
