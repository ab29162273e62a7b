//! Sync orchestration layer for synchro
//!
//! This crate ties the lower layers together:
//!
//! - **Location Catalog**: known config files per application and platform,
//!   optionally re-rooted under external mounts
//! - **Settings**: the optional `synchro.toml` user settings file
//! - **Sync Orchestrator**: source loading, target resolution and the bounded
//!   worker pool producing a [`SyncReport`]
//!
//! # Architecture
//!
//! ```text
//!                 synchro-cli
//!                      |
//!                synchro-core
//!                      |
//!               synchro-format
//!                 /         \
//!         synchro-model   synchro-fs
//! ```

pub mod catalog;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod settings;
pub mod source;

pub use catalog::{Catalog, CatalogEntry, DEFAULT_SOURCE, builtin_entries};
pub use error::{Error, Result, SourceError};
pub use orchestrator::{Orchestrator, SyncRequest, Target, resolve_targets};
pub use report::{ErrorKind, StatusCounts, SyncReport, SyncResult, SyncStatus};
pub use settings::{ExtraLocation, Settings};
pub use source::{load_source, resolve_source};
