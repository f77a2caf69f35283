//! Structured error types for the two propagating error categories:
//! configuration errors and I/O errors. Invariant violations are `panic!`s
//! with context at the call site instead, and transient physical
//! conditions are absorbed as counters — neither needs a type here.

use std::fmt;

/// A configuration-file or command-line problem. Reported immediately and
/// aborts the run.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    TruncatedFile {
        path: String,
        expected_lines: usize,
        found_lines: usize,
    },
    MalformedField {
        label: &'static str,
        line: String,
    },
    UnknownBoundaryTag {
        edge: &'static str,
        tag: char,
    },
    InconsistentPeriodicPair {
        axis: &'static str,
    },
    InvalidGeometry {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read configuration file '{path}': {source}")
            }
            ConfigError::TruncatedFile {
                path,
                expected_lines,
                found_lines,
            } => write!(
                f,
                "configuration file '{path}' is truncated: expected at least {expected_lines} lines, found {found_lines}"
            ),
            ConfigError::MalformedField { label, line } => write!(
                f,
                "could not parse a value for '{label}' from line: {line:?}"
            ),
            ConfigError::UnknownBoundaryTag { edge, tag } => {
                write!(f, "unknown boundary condition tag '{tag}' on edge {edge}")
            }
            ConfigError::InconsistentPeriodicPair { axis } => write!(
                f,
                "inconsistent periodic boundary pair on the {axis} axis: the core requires both edges of a periodic axis to be tagged 'p'"
            ),
            ConfigError::InvalidGeometry { message } => {
                write!(f, "invalid grid/species geometry: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The top-level error returned by the binary's `main`. Configuration
/// problems are the only propagating variant today; a catch-all carries
/// anything else the driver surfaces as non-recoverable before the first
/// invariant-checked step.
#[derive(Debug)]
pub enum RunError {
    Config(ConfigError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}
