//! Unified error types for capture sessions, configuration, and imports.

use std::fmt;
use std::path::PathBuf;

use crate::capture::Outcome;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised by the capture-session lifecycle.
#[derive(Debug)]
pub enum CaptureError {
    /// A terminal operation was invoked on a session that already left `pending`.
    ProtocolViolation {
        operation: &'static str,
        outcome: Outcome,
    },
    /// The durable write of a terminal transition did not complete.
    PersistenceFailure {
        location: PathBuf,
        source: std::io::Error,
    },
    /// The path does not carry the capture-buffer suffix.
    NotCaptureFile(PathBuf),
    /// Reading a capture buffer failed.
    Io(std::io::Error),
    /// The external text editor could not be launched or failed.
    Editor(String),
    /// The session was dropped while still pending; no signal will ever arrive.
    Abandoned,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolViolation { operation, outcome } => {
                write!(f, "protocol violation: {operation} on a session already {outcome}")
            }
            Self::PersistenceFailure { location, source } => {
                write!(f, "failed to persist {}: {source}", location.display())
            }
            Self::NotCaptureFile(path) => {
                write!(f, "not a capture buffer: {}", path.display())
            }
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Editor(msg) => write!(f, "editor: {msg}"),
            Self::Abandoned => write!(f, "capture session ended without signalling"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PersistenceFailure { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ImportError
// ---------------------------------------------------------------------------

/// Errors from statement import runs.
#[derive(Debug)]
pub enum ImportError {
    Config(ConfigError),
    Capture(CaptureError),
    Io(std::io::Error),
    /// The statement file extension is not one we can read.
    UnsupportedFormat(PathBuf),
    /// A statement row could not be parsed.
    Malformed { line: usize, message: String },
    /// A configured column name is missing from the statement header.
    MissingColumn(String),
    /// A required import setting was not provided.
    MissingSetting(&'static str),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported statement format: {}", path.display())
            }
            Self::Malformed { line, message } => {
                write!(f, "malformed statement at line {line}: {message}")
            }
            Self::MissingColumn(name) => write!(f, "statement has no column `{name}`"),
            Self::MissingSetting(name) => write!(f, "missing import setting `{name}`"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<ConfigError> for ImportError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CaptureError> for ImportError {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
