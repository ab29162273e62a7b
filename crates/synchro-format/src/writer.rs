//! Format Writer: merge an entry-set into a file, or preview the merge

use synchro_fs::{CommitGate, read_optional, write_atomic};
use synchro_model::ServerSet;
use tracing::{debug, info};

use crate::diff::{EntryDiff, canonical_section, diff_sections, text_preview};
use crate::document::RawDocument;
use crate::error::{Error, Result};
use crate::location::ConfigLocation;
use crate::reader::EntryWarning;

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Compute the diff only; the file is never touched.
    pub dry_run: bool,
    /// Create the file (and its parent directories) when it does not exist.
    pub create_missing: bool,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub diffs: Vec<EntryDiff>,
    /// At least one entry differs from the file.
    pub changed: bool,
    /// Bytes were persisted.
    pub written: bool,
    /// The file did not exist before this call.
    pub created: bool,
    /// Invalid entries found in the file before the merge.
    pub warnings: Vec<EntryWarning>,
    /// Unified diff of the file text, empty when nothing changes.
    pub preview: String,
}

/// Replace the section at `location` with `servers`.
///
/// The file is re-read here rather than trusting any earlier read. Nothing is
/// written when no entry differs or when `dry_run` is set; otherwise the new
/// text is written atomically, so a failure leaves the original bytes intact.
pub fn write(location: &ConfigLocation, servers: &ServerSet, options: WriteOptions) -> Result<WriteOutcome> {
    merge_into(location, servers, options, None)
}

/// [`write`], persisting only if `gate` can still be entered.
///
/// A closed gate yields [`Error::Abandoned`] with the file untouched.
pub fn write_gated(
    location: &ConfigLocation,
    servers: &ServerSet,
    options: WriteOptions,
    gate: &CommitGate,
) -> Result<WriteOutcome> {
    merge_into(location, servers, options, Some(gate))
}

fn merge_into(
    location: &ConfigLocation,
    servers: &ServerSet,
    options: WriteOptions,
    gate: Option<&CommitGate>,
) -> Result<WriteOutcome> {
    let (original, created) = match read_optional(&location.path)? {
        Some(text) => (text, false),
        None if options.create_missing => (String::new(), true),
        None => {
            return Err(Error::NotFound {
                path: location.path.clone(),
            });
        }
    };

    let document = RawDocument::parse(location, &original)?;
    let raw_section = document.section(location)?.unwrap_or_default();
    let (_, invalid) = ServerSet::from_raw(&raw_section);
    let warnings = invalid.into_iter().map(EntryWarning::from).collect();

    let desired = servers.to_canonical_map();
    let diffs = diff_sections(&canonical_section(&raw_section), &desired);
    let changed = diffs.iter().any(EntryDiff::is_change);

    let (rendered, preview) = if changed {
        let rendered = document.render_with(location, &original, &desired)?;
        let label = location.path.file_name().unwrap_or("config");
        let preview = text_preview(label, &original, &rendered);
        (Some(rendered), preview)
    } else {
        (None, String::new())
    };

    let mut written = false;
    match rendered {
        Some(rendered) if !options.dry_run => {
            if gate.is_some_and(|gate| !gate.enter()) {
                return Err(Error::Abandoned {
                    path: location.path.clone(),
                });
            }
            write_atomic(&location.path, rendered.as_bytes(), options.create_missing)
                .map_err(|e| Error::write(&location.path, e))?;
            info!(path = %location.path, created, "updated config file");
            written = true;
        }
        Some(_) => debug!(path = %location.path, "dry run, leaving file untouched"),
        None => debug!(path = %location.path, "entries already up to date"),
    }

    Ok(WriteOutcome {
        diffs,
        changed,
        written,
        created,
        warnings,
        preview,
    })
}
