//! Atomic I/O operations and mount probing

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use fs2::FileExt;
use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file.
///
/// The bytes go to a temp file in the target's directory (same filesystem),
/// are flushed to disk, and the temp file is renamed over the target. A crash
/// at any point leaves either the old file or the new file, never a truncated
/// one. Permissions of an existing target are carried over to the new file.
///
/// A symlinked target is written through: the temp file is created next to
/// the file the link points to and renamed over it, so the link survives.
///
/// When `create_parent` is false a missing parent directory is an error
/// instead of being created.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], create_parent: bool) -> Result<()> {
    let native_path = resolve_link(path.to_native());

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if create_parent {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        } else if !parent.is_dir() {
            return Err(Error::MissingParent {
                path: parent.to_path_buf(),
            });
        }
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("synchro"),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let outcome = (|| -> Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .lock_exclusive()
            .map_err(|_| Error::LockFailed {
                path: native_path.clone(),
            })?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        temp_file.unlock().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        if let Ok(metadata) = fs::metadata(&native_path) {
            fs::set_permissions(&temp_path, metadata.permissions())
                .map_err(|e| Error::io(&temp_path, e))?;
        }

        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    })();

    if outcome.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        debug!(path = %path, bytes = content.len(), "wrote file atomically");
    }
    outcome
}

/// The file a symlink points to, or `path` itself when it is not a link.
///
/// Dangling links resolve to their (possibly relative) target so the write
/// creates the file behind the link.
fn resolve_link(path: PathBuf) -> PathBuf {
    match fs::symlink_metadata(&path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {}
        _ => return path,
    }
    if let Ok(real) = dunce::canonicalize(&path) {
        return real;
    }
    match fs::read_link(&path) {
        Ok(target) if target.is_absolute() => target,
        Ok(target) => match path.parent() {
            Some(parent) => parent.join(target),
            None => target,
        },
        Err(_) => path,
    }
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content, mapping a missing file to `None`.
pub fn read_optional(path: &NormalizedPath) -> Result<Option<String>> {
    match read_text(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.io_kind() == Some(std::io::ErrorKind::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Run `task` on a detached thread, giving up after `timeout`.
///
/// Returns `None` when the deadline passes (or the task panics). A task that
/// overruns is abandoned, not cancelled.
pub fn with_deadline<T, F>(timeout: Duration, task: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(task());
    });
    rx.recv_timeout(timeout).ok()
}

const GATE_OPEN: u8 = 0;
const GATE_COMMITTING: u8 = 1;
const GATE_CLOSED: u8 = 2;

/// Decides whether a deadline-bounded task may still perform its side effect.
///
/// The task calls [`CommitGate::enter`] right before writing; the caller
/// calls [`CommitGate::close`] when the deadline passes. Exactly one of the
/// two succeeds.
#[derive(Debug, Clone, Default)]
pub struct CommitGate(Arc<AtomicU8>);

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to commit. `false` once the caller has given up.
    pub fn enter(&self) -> bool {
        self.transition(GATE_COMMITTING)
    }

    /// Give up on the task. `false` when it is already committing.
    pub fn close(&self) -> bool {
        self.transition(GATE_CLOSED)
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire) == GATE_CLOSED
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(GATE_OPEN, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Like [`with_deadline`], for tasks with a side effect guarded by a
/// [`CommitGate`].
///
/// When the deadline passes before the task enters the gate, the gate is
/// closed and `None` is returned; the task must then skip its side effect.
/// A task that entered the gate in time is waited for, so the returned value
/// always matches what it did.
pub fn with_commit_deadline<T, F>(timeout: Duration, task: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&CommitGate) -> T + Send + 'static,
{
    let gate = CommitGate::new();
    let worker_gate = gate.clone();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(task(&worker_gate));
    });

    match rx.recv_timeout(timeout) {
        Ok(value) => Some(value),
        Err(RecvTimeoutError::Disconnected) => None,
        Err(RecvTimeoutError::Timeout) if gate.close() => None,
        Err(RecvTimeoutError::Timeout) => rx.recv().ok(),
    }
}

/// Check that a directory answers a metadata call within `timeout`.
pub fn probe_dir(path: &NormalizedPath, timeout: Duration) -> Result<()> {
    let native_path = path.to_native();
    let probe_path = native_path.clone();

    match with_deadline(timeout, move || fs::metadata(&probe_path)) {
        Some(Ok(metadata)) if metadata.is_dir() => Ok(()),
        Some(Ok(_)) => Err(Error::MountUnreachable {
            path: native_path,
            reason: "not a directory".into(),
        }),
        Some(Err(e)) => Err(Error::MountUnreachable {
            path: native_path,
            reason: e.to_string(),
        }),
        None => Err(Error::MountTimeout {
            path: native_path,
            timeout,
        }),
    }
}
