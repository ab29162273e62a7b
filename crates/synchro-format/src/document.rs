//! Parsed config files

use serde_json::{Map, Value};
use toml_edit::DocumentMut;
use tracing::debug;

use crate::error::{Error, Result};
use crate::handlers::{json, toml};
use crate::location::{ConfigLocation, FormatKind};

/// The full parsed tree of one file.
///
/// Only the entry-set section is ever interpreted; everything else is kept
/// as parsed so it can be written back untouched.
#[derive(Debug, Clone)]
pub enum RawDocument {
    Json(Value),
    Toml(DocumentMut),
}

impl RawDocument {
    /// Empty document of the given format.
    pub fn empty(format: FormatKind) -> Self {
        match format {
            FormatKind::Toml => Self::Toml(DocumentMut::new()),
            FormatKind::JsonRoot | FormatKind::JsonNested => Self::Json(Value::Object(Map::new())),
        }
    }

    /// Parse file text. Blank text is an empty document, not an error.
    pub fn parse(location: &ConfigLocation, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::empty(location.format));
        }
        match location.format {
            FormatKind::Toml => text.parse::<DocumentMut>().map(Self::Toml).map_err(|e| {
                let (line, column) = e
                    .span()
                    .map_or((1, 1), |span| line_column(text, span.start));
                Error::Parse {
                    path: location.path.clone(),
                    line,
                    column,
                    message: e.message().trim().to_string(),
                }
            }),
            FormatKind::JsonRoot | FormatKind::JsonNested => serde_json::from_str::<Value>(text)
                .map(Self::Json)
                .map_err(|e| {
                    let full = e.to_string();
                    let message = full.split(" at line ").next().unwrap_or(&full).to_string();
                    Error::Parse {
                        path: location.path.clone(),
                        line: e.line(),
                        column: e.column(),
                        message,
                    }
                }),
        }
    }

    /// The raw entry-set object with canonical key spellings.
    ///
    /// `None` when the section is absent, which is how a file that has never
    /// held entries looks.
    pub fn section(&self, location: &ConfigLocation) -> Result<Option<Map<String, Value>>> {
        let found = match self {
            Self::Json(root) => json::section(root, &location.section).map(|s| s.cloned()),
            Self::Toml(doc) => toml::read_section(doc, &location.section),
        };
        found.map_err(|kind| Error::InvalidSection {
            path: location.path.clone(),
            section: location.section_key(),
            found: kind.to_string(),
        })
    }

    /// Render the file with its section replaced by `entries`.
    ///
    /// `original` is the text this document was parsed from; JSON output is
    /// spliced into it so bytes outside the section are unchanged.
    pub fn render_with(
        &self,
        location: &ConfigLocation,
        original: &str,
        entries: &Map<String, Value>,
    ) -> Result<String> {
        match self {
            Self::Json(root) => {
                let value = Value::Object(entries.clone());
                let rendered = if original.trim().is_empty() {
                    json::fresh(&location.section, &value)
                } else {
                    json::splice(original, &location.section, &value).or_else(|| {
                        debug!(path = %location.path, "section could not be spliced, re-rendering document");
                        json::rerender(root.clone(), &location.section, &value)
                    })
                };
                rendered.ok_or_else(|| Error::write(&location.path, "could not render JSON document"))
            }
            Self::Toml(doc) => {
                let mut doc = doc.clone();
                toml::write_section(&mut doc, &location.section, entries);
                Ok(doc.to_string())
            }
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |tail| tail.chars().count())
        + 1;
    (line, column)
}
