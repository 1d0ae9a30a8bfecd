use crate::config::schema::{RemapConfig, ValidationError};
use crate::error::ErrorKind;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read remap config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed remap config {origin}: {source}")]
    Toml {
        origin: String,
        source: toml_edit::de::Error,
    },

    #[error("invalid remap config {origin}: {source}")]
    Validation {
        origin: String,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Toml { .. } => ErrorKind::MalformedInput,
            ConfigError::Validation { .. } => ErrorKind::Configuration,
        }
    }

    /// Where the config came from: its path, or the name given to [`RemapConfig::parse`].
    pub fn origin(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => path.display().to_string(),
            ConfigError::Toml { origin, .. } | ConfigError::Validation { origin, .. } => {
                origin.clone()
            }
        }
    }
}

impl RemapConfig {
    /// Parse and validate a config named `origin` in errors.
    /// Relative paths are left as written.
    pub fn parse(input: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: RemapConfig =
            toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
                origin: origin.to_string(),
                source,
            })?;
        config
            .validate()
            .map_err(|source| ConfigError::Validation {
                origin: origin.to_string(),
                source,
            })?;
        Ok(config)
    }

    /// Load a config file, resolving its relative paths against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&contents, &path.display().to_string())?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }
}
