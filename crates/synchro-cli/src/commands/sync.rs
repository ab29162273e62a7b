//! Sync command
//!
//! Builds a [`SyncRequest`] from flags and settings, runs it, and prints the
//! per-target report. Target failures are reported, not turned into a
//! non-zero exit; only source problems fail the command.

use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use synchro_core::{ErrorKind, Orchestrator, SyncReport, SyncRequest, SyncResult, SyncStatus};
use synchro_format::DiffKind;

use crate::context::AppContext;
use crate::error::Result;

/// Flags of the sync command
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub source: Option<PathBuf>,
    pub targets: Vec<PathBuf>,
    pub mounts: Vec<PathBuf>,
    pub dry_run: bool,
    pub jobs: Option<usize>,
}

/// Run the sync command
pub fn run_sync(ctx: &AppContext, args: SyncArgs) -> Result<()> {
    let mut request = SyncRequest::from_settings(&ctx.settings);
    request.source = ctx.source_override(args.source);
    request.targets = args.targets;
    request.mounts = ctx.mounts(args.mounts);
    request.dry_run = args.dry_run;
    if let Some(jobs) = args.jobs {
        request.jobs = jobs;
    }

    if request.dry_run {
        println!("{}\n", "Dry run mode - no changes will be made".yellow());
    }

    let report = Orchestrator::new(ctx.catalog.clone()).run_sync(&request)?;
    print!("{}", render_report(&report, ctx.verbose));
    Ok(())
}

fn status_label(status: SyncStatus) -> ColoredString {
    match status {
        SyncStatus::Updated => "UPDATED".green().bold(),
        SyncStatus::Unchanged => "OK".green(),
        SyncStatus::Skipped => "SKIPPED".yellow(),
        SyncStatus::Failed => "FAILED".red().bold(),
    }
}

fn diff_symbol(kind: DiffKind) -> ColoredString {
    match kind {
        DiffKind::Added => kind.symbol().green(),
        DiffKind::Removed => kind.symbol().red(),
        DiffKind::Changed => kind.symbol().yellow(),
        DiffKind::Unchanged => kind.symbol().dimmed(),
    }
}

/// Absent catalog targets are only listed with `--verbose`.
fn is_quiet(result: &SyncResult) -> bool {
    result.status == SyncStatus::Skipped && result.error == Some(ErrorKind::NotFound)
}

fn render_report(report: &SyncReport, verbose: bool) -> String {
    let mut out = format!("{} {}\n\n", "Source:".cyan(), report.source.path);

    for result in &report.results {
        if is_quiet(result) && !verbose {
            continue;
        }
        let message = result.message.as_deref().unwrap_or_default();
        out.push_str(&format!(
            "  {:<8} {:<28} {}  {}\n",
            status_label(result.status),
            result.location.application_id.cyan(),
            result.location.path,
            message.dimmed()
        ));

        for diff in result.changes() {
            out.push_str(&format!("           {} {}\n", diff_symbol(diff.kind), diff.name));
            if verbose && diff.kind == DiffKind::Changed {
                for change in &diff.field_changes {
                    out.push_str(&format!("               {}\n", change.to_string().dimmed()));
                }
            }
        }
        for warning in &result.warnings {
            out.push_str(&format!("           {} replaced invalid entry {}\n", "!".yellow(), warning));
        }
        if verbose && !result.preview.is_empty() {
            out.push('\n');
            for line in result.preview.lines() {
                out.push_str(&format!("      {line}\n"));
            }
            out.push('\n');
        }
    }

    let counts = &report.counts;
    out.push_str(&format!(
        "\n{} updated, {} unchanged, {} skipped, {} failed\n",
        counts.updated.to_string().green(),
        counts.unchanged,
        counts.skipped.to_string().yellow(),
        counts.failed.to_string().red()
    ));
    out
}
