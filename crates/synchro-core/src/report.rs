//! Sync results

use std::fmt;

use synchro_format::{ConfigLocation, EntryDiff, EntryWarning};

/// Outcome of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// Entries differed and were written (or would be, in a dry run).
    Updated,
    Unchanged,
    Skipped,
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        })
    }
}

/// Why a target was skipped or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Write,
    Read,
    Mount,
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "parse error",
            Self::Write => "write error",
            Self::Read => "read error",
            Self::Mount => "mount unreachable",
            Self::NotFound => "not found",
        })
    }
}

#[derive(Debug, Clone)]
pub struct SyncResult {
    pub location: ConfigLocation,
    pub status: SyncStatus,
    pub diffs: Vec<EntryDiff>,
    pub error: Option<ErrorKind>,
    pub message: Option<String>,
    /// Invalid entries found in the target before it was overwritten.
    pub warnings: Vec<EntryWarning>,
    /// Unified diff of the file text; empty unless the target changed.
    pub preview: String,
}

impl SyncResult {
    pub fn skipped(location: ConfigLocation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::bare(location, SyncStatus::Skipped, Some(kind), Some(message.into()))
    }

    pub fn failed(location: ConfigLocation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::bare(location, SyncStatus::Failed, Some(kind), Some(message.into()))
    }

    fn bare(
        location: ConfigLocation,
        status: SyncStatus,
        error: Option<ErrorKind>,
        message: Option<String>,
    ) -> Self {
        Self {
            location,
            status,
            diffs: Vec::new(),
            error,
            message,
            warnings: Vec::new(),
            preview: String::new(),
        }
    }

    /// Diffs that actually change something.
    pub fn changes(&self) -> impl Iterator<Item = &EntryDiff> {
        self.diffs.iter().filter(|d| d.is_change())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: SyncStatus) {
        match status {
            SyncStatus::Updated => self.updated += 1,
            SyncStatus::Unchanged => self.unchanged += 1,
            SyncStatus::Skipped => self.skipped += 1,
            SyncStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.skipped + self.failed
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} unchanged, {} skipped, {} failed",
            self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Everything one sync run produced, in target order.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: ConfigLocation,
    pub dry_run: bool,
    pub results: Vec<SyncResult>,
    pub counts: StatusCounts,
}

impl SyncReport {
    pub fn new(source: ConfigLocation, dry_run: bool, results: Vec<SyncResult>) -> Self {
        let mut counts = StatusCounts::default();
        for result in &results {
            counts.record(result.status);
        }
        Self {
            source,
            dry_run,
            results,
            counts,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
    }

    pub fn statuses(&self) -> Vec<SyncStatus> {
        self.results.iter().map(|r| r.status).collect()
    }
}
