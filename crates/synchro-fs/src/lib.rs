//! Filesystem primitives for synchro
//!
//! Provides normalized path handling (including re-rooting a home-relative
//! path under an alternate mount), crash-safe atomic writes, and a bounded
//! reachability probe for mount roots that may sit on slow or dead volumes.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::{
    CommitGate, probe_dir, read_optional, read_text, with_commit_deadline, with_deadline, write_atomic,
};
pub use path::NormalizedPath;
