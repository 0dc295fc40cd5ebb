// Centralized error handling module
// Context-rich error types for registry, session, and digest operations

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for the hashing engine.
///
/// Registry and handle errors are returned synchronously at the call site.
/// Hashing errors that occur inside a worker never surface as this type to
/// the caller; they are rendered into the job's `failure_reason` and are
/// discovered by polling.
#[derive(Debug)]
pub enum EngineError {
    /// Registration rejected because the path is empty or unusable
    InvalidPath { path: PathBuf },

    /// The path exists but is not a regular file
    NotAFile { path: PathBuf },

    /// File system errors with context
    FileNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    IoError { path: Option<PathBuf>, operation: String, source: io::Error },

    /// The requested algorithm is not in the digest registry
    UnsupportedAlgorithm { algorithm: String },

    /// The handle does not reference a live job (unknown, removed, or stale)
    IndexOutOfRange { index: u32 },

    /// Structural mutation rejected: the job is claimed by an active session
    JobBusy { index: u32 },

    /// Structural mutation rejected: the session still has active jobs
    SessionActive { active: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineError::InvalidPath { path } => {
                write!(f, "Invalid path: {:?}", path)
            }
            EngineError::NotAFile { path } => {
                write!(f, "Not a regular file: {}", path.display())
            }
            EngineError::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            EngineError::PermissionDenied { path, operation } => {
                write!(f, "Permission denied while {} file: {}", operation, path.display())
            }
            EngineError::IoError { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} file {}: {}", operation, p.display(), source)
                } else {
                    write!(f, "I/O error while {}: {}", operation, source)
                }
            }
            EngineError::UnsupportedAlgorithm { algorithm } => {
                write!(f, "Unsupported hash algorithm: {}", algorithm)
            }
            EngineError::IndexOutOfRange { index } => {
                write!(f, "Index out of range: no registered job at index {}", index)
            }
            EngineError::JobBusy { index } => {
                write!(f, "Job at index {} is busy: still claimed by the running session", index)
            }
            EngineError::SessionActive { active } => {
                write!(f, "Session active: {} job(s) still in flight", active)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EngineError {
    /// Create an error from `io::Error` with context about the operation
    /// and the path involved. Maps the common kinds to dedicated variants.
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(p)) => EngineError::FileNotFound { path: p },
            (io::ErrorKind::PermissionDenied, Some(p)) => EngineError::PermissionDenied {
                path: p,
                operation: operation.to_string(),
            },
            (_, path) => EngineError::IoError {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }
}
