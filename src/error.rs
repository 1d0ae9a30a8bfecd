use crate::apply::ApplyError;
use crate::config::ConfigError;
use crate::mapping::MappingError;
use crate::rangemap::RangeMapError;
use crate::safety::SafetyError;
use std::fmt;
use thiserror::Error;

/// Classification shared by every fatal error a run can produce.
///
/// A symbol without a rename entry is never an error and has no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input artifact could not be parsed; nothing from it is used.
    MalformedInput,
    /// Inputs parse but contradict each other or the source text.
    ConsistencyViolation,
    /// The run configuration is unusable.
    Configuration,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::ConsistencyViolation => "consistency violation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Io => "I/O",
        };
        f.write_str(name)
    }
}

/// Any fatal error of a remapping run.
#[derive(Error, Debug)]
pub enum RemapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    RangeMap(#[from] RangeMapError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

impl RemapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemapError::Config(e) => e.kind(),
            RemapError::Mapping(e) => e.kind(),
            RemapError::RangeMap(e) => e.kind(),
            RemapError::Apply(e) => e.kind(),
            RemapError::Safety(e) => e.kind(),
        }
    }
}
