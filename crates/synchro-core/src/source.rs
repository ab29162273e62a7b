//! Source resolution and loading

use std::path::Path;

use synchro_format::{ConfigLocation, Error as FormatError, read};
use synchro_model::ServerSet;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::SourceError;

/// Explicit path if given, else the catalog's default source.
pub fn resolve_source(explicit: Option<&Path>, catalog: &Catalog) -> Result<ConfigLocation, SourceError> {
    match explicit {
        Some(path) => Ok(ConfigLocation::for_path(path)),
        None => catalog.default_source().ok_or(SourceError::NoDefault),
    }
}

/// Read the source entry-set.
///
/// Unlike targets, a source with any invalid entry is rejected outright, and
/// so is one without the section at all. An explicitly empty section is a
/// valid (empty) entry-set.
pub fn load_source(location: &ConfigLocation) -> Result<ServerSet, SourceError> {
    let outcome = match read(location) {
        Ok(outcome) => outcome,
        Err(FormatError::NotFound { path }) => return Err(SourceError::NotFound { path }),
        Err(source) => {
            return Err(SourceError::Unreadable {
                path: location.path.clone(),
                source,
            });
        }
    };

    if outcome.raw_section.is_none() {
        return Err(SourceError::NoSection {
            path: location.path.clone(),
            section: location.section_key(),
        });
    }

    if !outcome.warnings.is_empty() {
        return Err(SourceError::InvalidEntries {
            path: location.path.clone(),
            warnings: outcome.warnings,
        });
    }

    debug!(path = %location.path, servers = outcome.servers.len(), "loaded source");
    Ok(outcome.servers)
}
