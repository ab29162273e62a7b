//! Error types for synchro-core

use std::path::PathBuf;

use synchro_format::EntryWarning;
use synchro_fs::NormalizedPath;

/// Result type for synchro-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole invocation.
///
/// Problems with a single target never show up here; they are folded into
/// the [`SyncReport`](crate::SyncReport).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source entry-set could not be used
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Settings file exists but is malformed
    #[error("Invalid settings in {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// No home directory to resolve catalog templates against
    #[error("Could not determine the home directory")]
    NoHome,

    /// Worker pool could not be created
    #[error("Failed to start worker pool: {0}")]
    Pool(String),
}

/// Why the source entry-set is unusable. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source file not found: {path}")]
    NotFound { path: NormalizedPath },

    #[error("No source given and the catalog has no default source")]
    NoDefault,

    #[error("Source {path} has no '{section}' section")]
    NoSection { path: NormalizedPath, section: String },

    #[error("Cannot read source {path}: {source}")]
    Unreadable {
        path: NormalizedPath,
        #[source]
        source: synchro_format::Error,
    },

    #[error("Source {path} has {}", summarize(.warnings))]
    InvalidEntries {
        path: NormalizedPath,
        warnings: Vec<EntryWarning>,
    },
}

fn summarize(warnings: &[EntryWarning]) -> String {
    let noun = if warnings.len() == 1 { "entry" } else { "entries" };
    let details = warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} invalid {noun}: {details}", warnings.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_entries_lists_every_warning() {
        let error = SourceError::InvalidEntries {
            path: NormalizedPath::new("/h/src.json"),
            warnings: vec![
                EntryWarning {
                    name: "a".into(),
                    field: String::new(),
                    reason: "entry must declare either 'command' or 'url'".into(),
                },
                EntryWarning {
                    name: "b".into(),
                    field: "args[0]".into(),
                    reason: "must be a string, found number".into(),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "Source /h/src.json has 2 invalid entries: a: entry must declare either 'command' or 'url'; b.args[0]: must be a string, found number"
        );
    }

    #[test]
    fn no_section_names_the_key() {
        let error = SourceError::NoSection {
            path: NormalizedPath::new("/h/src.json"),
            section: "mcpServers".into(),
        };
        assert_eq!(error.to_string(), "Source /h/src.json has no 'mcpServers' section");
    }

    #[test]
    fn source_error_is_transparent() {
        let error: Error = SourceError::NoDefault.into();
        assert_eq!(
            error.to_string(),
            "No source given and the catalog has no default source"
        );
    }
}
