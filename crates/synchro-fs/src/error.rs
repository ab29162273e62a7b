//! Error types for synchro-fs

use std::path::PathBuf;
use std::time::Duration;

/// Result type for synchro-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in synchro-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Parent directory does not exist: {path}")]
    MissingParent { path: PathBuf },

    #[error("Mount root {path} is unreachable: {reason}")]
    MountUnreachable { path: PathBuf, reason: String },

    #[error("Mount root {path} did not respond within {timeout:?}")]
    MountTimeout { path: PathBuf, timeout: Duration },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The underlying I/O error kind, if this error wraps one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Whether this error describes an unreachable or unresponsive mount.
    pub fn is_mount_error(&self) -> bool {
        matches!(self, Self::MountUnreachable { .. } | Self::MountTimeout { .. })
    }
}
