use super::loader::CONF_MAPPINGS;
use crate::error::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("malformed mapping line {line} in {origin}: {message}: {text:?}")]
    Malformed {
        origin: String,
        line: usize,
        text: String,
        message: &'static str,
    },

    #[error("no {} in {}", CONF_MAPPINGS.join(" or "), dir.display())]
    NoConfMapping { dir: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MappingError {
    pub(crate) fn malformed(origin: &str, line: usize, text: &str, message: &'static str) -> Self {
        MappingError::Malformed {
            origin: origin.to_string(),
            line,
            text: text.to_string(),
            message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MappingError::Malformed { .. } => ErrorKind::MalformedInput,
            MappingError::NoConfMapping { .. } | MappingError::Io { .. } => ErrorKind::Io,
        }
    }
}

pub(crate) fn read_input(path: &std::path::Path) -> Result<String, MappingError> {
    std::fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })
}
