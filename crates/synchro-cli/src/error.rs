//! Error types for synchro-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from synchro-core
    #[error(transparent)]
    Core(#[from] synchro_core::Error),

    /// Error from synchro-format
    #[error(transparent)]
    Format(#[from] synchro_format::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

impl From<synchro_core::SourceError> for CliError {
    fn from(err: synchro_core::SourceError) -> Self {
        Self::Core(err.into())
    }
}
