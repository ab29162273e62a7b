//! Error types for synchro-format

use synchro_fs::NormalizedPath;

/// Result type for synchro-format operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing one config file
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}:{line}:{column}: {message}")]
    Parse {
        path: NormalizedPath,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Config file not found: {path}")]
    NotFound { path: NormalizedPath },

    #[error("Section '{section}' in {path} must be a table, found {found}")]
    InvalidSection {
        path: NormalizedPath,
        section: String,
        found: String,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: NormalizedPath, reason: String },

    #[error("Gave up on {path} before writing")]
    Abandoned { path: NormalizedPath },

    #[error(transparent)]
    Io(#[from] synchro_fs::Error),
}

impl Error {
    pub fn write(path: &NormalizedPath, reason: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.clone(),
            reason: reason.to_string(),
        }
    }
}
