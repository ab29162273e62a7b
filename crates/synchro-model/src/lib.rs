//! Canonical MCP server entry model
//!
//! Every client application spells server entries slightly differently
//! (`disabled` vs `enabled`, `streamable-http` vs `streamableHttp`). This crate
//! is the single normalization boundary: raw maps go in through
//! [`parse_entry`], validated [`ServerEntry`] values come out, and
//! [`ServerEntry::to_canonical_map`] is the only way back to an untyped map.

pub mod entry;
pub mod error;
pub mod parse;
pub mod schema;
pub mod set;

pub use entry::{RemoteType, ServerEntry, Transport};
pub use error::ValidationError;
pub use parse::{parse_entry, parse_entry_value};
pub use schema::servers_schema;
pub use set::{InvalidEntry, ServerSet};
