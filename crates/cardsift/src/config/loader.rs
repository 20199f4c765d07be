use std::path::Path;

use crate::config::schema::Settings;
use crate::error::ConfigError;

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(content)?;

    validate_settings(&settings)?;

    Ok(settings)
}

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.chunk_size == 0 {
        return Err(ConfigError::Validation {
            message: "Chunk size must be greater than 0.".to_string(),
        });
    }

    if settings.parallelism == Some(0) {
        return Err(ConfigError::Validation {
            message: "Parallelism must be greater than 0.".to_string(),
        });
    }

    Ok(())
}
