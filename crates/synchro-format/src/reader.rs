//! Format Reader: file to validated entry-set

use std::fmt;

use serde_json::{Map, Value};
use synchro_fs::read_optional;
use synchro_model::{InvalidEntry, ServerSet, ValidationError};
use tracing::{debug, warn};

use crate::document::RawDocument;
use crate::error::{Error, Result};
use crate::location::ConfigLocation;

/// An entry that was dropped from the extracted set because it is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryWarning {
    pub name: String,
    /// Field path within the entry, empty for entry-level problems.
    pub field: String,
    pub reason: String,
}

impl From<InvalidEntry> for EntryWarning {
    fn from(invalid: InvalidEntry) -> Self {
        Self {
            name: invalid.name,
            field: invalid.error.field,
            reason: invalid.error.reason,
        }
    }
}

impl fmt::Display for EntryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = ValidationError::new(self.field.clone(), self.reason.clone()).within(&self.name);
        write!(f, "{error}")
    }
}

/// Everything learned from one read.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub document: RawDocument,
    /// The section as written, `None` when the file has no section.
    pub raw_section: Option<Map<String, Value>>,
    pub servers: ServerSet,
    pub warnings: Vec<EntryWarning>,
}

/// Read and validate the entry-set at `location`.
///
/// A missing file is [`Error::NotFound`]; a missing section is an empty set.
pub fn read(location: &ConfigLocation) -> Result<ReadOutcome> {
    let text = read_optional(&location.path)?.ok_or_else(|| Error::NotFound {
        path: location.path.clone(),
    })?;
    debug!(path = %location.path, bytes = text.len(), "read config file");
    read_str(location, &text)
}

/// [`read`] over text already in memory.
pub fn read_str(location: &ConfigLocation, text: &str) -> Result<ReadOutcome> {
    let document = RawDocument::parse(location, text)?;
    let raw_section = document.section(location)?;

    let (servers, invalid) = match &raw_section {
        Some(section) => ServerSet::from_raw(section),
        None => (ServerSet::new(), Vec::new()),
    };
    let warnings: Vec<EntryWarning> = invalid.into_iter().map(EntryWarning::from).collect();
    for warning in &warnings {
        warn!(path = %location.path, entry = %warning.name, "skipping invalid entry: {warning}");
    }

    Ok(ReadOutcome {
        document,
        raw_section,
        servers,
        warnings,
    })
}
