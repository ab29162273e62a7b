//! Sync Orchestrator
//!
//! Resolves the source and the target list, then runs every target through
//! the Format Writer on a bounded worker pool. Per-target problems become
//! entries in the [`SyncReport`]; only source problems abort the run.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use synchro_format::{ConfigLocation, Error as FormatError, WriteOptions, write, write_gated};
use synchro_fs::{CommitGate, NormalizedPath, probe_dir, with_commit_deadline};
use synchro_model::ServerSet;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::report::{ErrorKind, SyncReport, SyncResult, SyncStatus};
use crate::settings::Settings;
use crate::source::{load_source, resolve_source};

/// Inputs of one sync run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Source file; the catalog default when `None`.
    pub source: Option<PathBuf>,
    /// Explicit targets; the whole catalog when empty.
    pub targets: Vec<PathBuf>,
    /// Alternate roots searched with the catalog's relative paths.
    pub mounts: Vec<PathBuf>,
    pub dry_run: bool,
    pub jobs: usize,
    /// Deadline for probing a mount and for each target under it.
    pub mount_timeout: Duration,
}

impl SyncRequest {
    /// Request carrying the settings' defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            source: settings.source.clone(),
            targets: Vec::new(),
            mounts: settings.mounts.clone(),
            dry_run: false,
            jobs: settings.jobs(),
            mount_timeout: settings.mount_timeout(),
        }
    }
}

/// A location scheduled for syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub location: ConfigLocation,
    /// Named on the command line; created when absent.
    pub explicit: bool,
    /// Mount root this location was re-rooted under.
    pub mount: Option<NormalizedPath>,
}

/// Build the ordered, de-duplicated target list.
///
/// Explicit paths replace the catalog. The source is never a target, and two
/// locations resolving to the same file collapse to the first one. The result
/// is stably sorted by application then platform.
pub fn resolve_targets(
    catalog: &Catalog,
    source: &ConfigLocation,
    explicit: &[PathBuf],
    mounts: &[NormalizedPath],
) -> Vec<Target> {
    let candidates: Vec<Target> = if explicit.is_empty() {
        let home = catalog.locations().into_iter().map(|location| Target {
            location,
            explicit: false,
            mount: None,
        });
        let mounted = mounts.iter().flat_map(|mount| {
            catalog
                .locations_under(mount)
                .into_iter()
                .map(move |location| Target {
                    location,
                    explicit: false,
                    mount: Some(mount.clone()),
                })
        });
        home.chain(mounted).collect()
    } else {
        explicit
            .iter()
            .map(|path| Target {
                location: ConfigLocation::for_path(path.as_path()),
                explicit: true,
                mount: None,
            })
            .collect()
    };

    let mut seen = HashSet::new();
    seen.insert(source.path.canonical());

    let mut targets: Vec<Target> = candidates
        .into_iter()
        .filter(|target| {
            let fresh = seen.insert(target.location.path.canonical());
            if !fresh {
                debug!(path = %target.location.path, "dropping duplicate target");
            }
            fresh
        })
        .collect();

    targets.sort_by(|a, b| {
        (&a.location.application_id, a.location.platform).cmp(&(&b.location.application_id, b.location.platform))
    });
    targets
}

/// Runs sync requests against one catalog snapshot.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    catalog: Catalog,
}

impl Orchestrator {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sync the source entry-set into every target.
    ///
    /// Returns `Err` only when the source cannot be used or the worker pool
    /// cannot start; nothing has been written in either case.
    pub fn run_sync(&self, request: &SyncRequest) -> Result<SyncReport> {
        let source = resolve_source(request.source.as_deref(), &self.catalog)?;
        let servers = load_source(&source)?;
        info!(source = %source.path, servers = servers.len(), dry_run = request.dry_run, "starting sync");

        let mounts: Vec<NormalizedPath> = request.mounts.iter().map(NormalizedPath::new).collect();
        let targets = resolve_targets(&self.catalog, &source, &request.targets, &mounts);
        let results = run_targets(&targets, Arc::new(servers), &mounts, request)?;

        let report = SyncReport::new(source, request.dry_run, results);
        info!(counts = %report.counts, "sync finished");
        Ok(report)
    }
}

fn run_targets(
    targets: &[Target],
    servers: Arc<ServerSet>,
    mounts: &[NormalizedPath],
    request: &SyncRequest,
) -> Result<Vec<SyncResult>> {
    let unreachable = probe_mounts(mounts, request.mount_timeout);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(request.jobs.max(1))
        .build()
        .map_err(|e| Error::Pool(e.to_string()))?;

    Ok(pool.install(|| {
        targets
            .par_iter()
            .map(|target| run_target(target, &servers, &unreachable, request))
            .collect()
    }))
}

/// Probe each mount once; maps unreachable mounts to the reason.
fn probe_mounts(mounts: &[NormalizedPath], timeout: Duration) -> HashMap<NormalizedPath, String> {
    let mut unreachable = HashMap::new();
    for mount in mounts {
        if unreachable.contains_key(mount) {
            continue;
        }
        if let Err(e) = probe_dir(mount, timeout) {
            warn!(mount = %mount, "skipping unreachable mount: {e}");
            unreachable.insert(mount.clone(), e.to_string());
        }
    }
    unreachable
}

fn run_target(
    target: &Target,
    servers: &Arc<ServerSet>,
    unreachable: &HashMap<NormalizedPath, String>,
    request: &SyncRequest,
) -> SyncResult {
    let Some(mount) = &target.mount else {
        return sync_target(&target.location, servers, target.explicit, request.dry_run, None);
    };

    if let Some(reason) = unreachable.get(mount) {
        return SyncResult::skipped(target.location.clone(), ErrorKind::Mount, reason.clone());
    }

    let location = target.location.clone();
    let servers = Arc::clone(servers);
    let (explicit, dry_run) = (target.explicit, request.dry_run);
    with_commit_deadline(request.mount_timeout, move |gate| {
        sync_target(&location, &servers, explicit, dry_run, Some(gate))
    })
    .unwrap_or_else(|| {
        warn!(path = %target.location.path, "target on mount {mount} timed out");
        SyncResult::skipped(
            target.location.clone(),
            ErrorKind::Mount,
            format!("no response within {:?}", request.mount_timeout),
        )
    })
}

/// Merge into one target. With a `gate`, the write happens only if the gate
/// can still be entered.
fn sync_target(
    location: &ConfigLocation,
    servers: &ServerSet,
    explicit: bool,
    dry_run: bool,
    gate: Option<&CommitGate>,
) -> SyncResult {
    if !explicit && !location.path.exists() {
        debug!(application = %location.application_id, path = %location.path, "target not present");
        return SyncResult::skipped(location.clone(), ErrorKind::NotFound, "file not found");
    }

    let options = WriteOptions {
        dry_run,
        create_missing: explicit,
    };

    let written = match gate {
        Some(gate) => write_gated(location, servers, options, gate),
        None => write(location, servers, options),
    };

    match written {
        Ok(outcome) => {
            let (status, message) = match (outcome.changed, dry_run, outcome.created) {
                (false, _, _) => (SyncStatus::Unchanged, "up to date"),
                (true, true, _) => (SyncStatus::Updated, "would update (dry run)"),
                (true, false, true) => (SyncStatus::Updated, "created"),
                (true, false, false) => (SyncStatus::Updated, "updated"),
            };
            if outcome.written {
                info!(application = %location.application_id, path = %location.path, "updated target");
            }
            SyncResult {
                location: location.clone(),
                status,
                diffs: outcome.diffs,
                error: None,
                message: Some(message.to_string()),
                warnings: outcome.warnings,
                preview: outcome.preview,
            }
        }
        Err(FormatError::NotFound { .. }) => {
            SyncResult::skipped(location.clone(), ErrorKind::NotFound, "file not found")
        }
        Err(err) => {
            let kind = classify(&err);
            error!(application = %location.application_id, path = %location.path, "target failed: {err}");
            SyncResult::failed(location.clone(), kind, err.to_string())
        }
    }
}

fn classify(err: &FormatError) -> ErrorKind {
    match err {
        FormatError::Parse { .. } | FormatError::InvalidSection { .. } => ErrorKind::Parse,
        FormatError::Write { .. } => ErrorKind::Write,
        FormatError::NotFound { .. } => ErrorKind::NotFound,
        FormatError::Abandoned { .. } => ErrorKind::Mount,
        FormatError::Io(io) if io.is_mount_error() => ErrorKind::Mount,
        FormatError::Io(_) => ErrorKind::Read,
    }
}
