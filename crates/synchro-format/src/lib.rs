//! Merge-preserving access to MCP entry-sets in client config files
//!
//! Two serialization families are supported: JSON (with the entry-set at the
//! root or beside unrelated settings) and TOML (`[mcp_servers.<name>]`
//! tables). Reading extracts and validates the entry-set without discarding
//! anything else; writing replaces only that section, atomically.

pub mod diff;
pub mod document;
pub mod error;
pub mod handlers;
pub mod location;
pub mod reader;
pub mod writer;

pub use diff::{DiffKind, EntryDiff, FieldChange, text_preview};
pub use document::RawDocument;
pub use error::{Error, Result};
pub use location::{ConfigLocation, FormatKind, Platform};
pub use reader::{EntryWarning, ReadOutcome, read, read_str};
pub use writer::{WriteOptions, WriteOutcome, write, write_gated};
