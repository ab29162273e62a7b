//! List command

use std::path::PathBuf;

use colored::Colorize;
use synchro_core::resolve_source;
use synchro_format::ConfigLocation;
use synchro_fs::NormalizedPath;

use crate::context::{AppContext, normalize_all};
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &AppContext, mounts: Vec<PathBuf>) -> Result<()> {
    let mounts = normalize_all(&ctx.mounts(mounts));
    let locations = ctx.catalog.discover(&mounts);
    let source = resolve_source(ctx.settings.source.as_deref(), &ctx.catalog)
        .ok()
        .map(|location| location.path.canonical());

    print!("{}", render_list(&locations, source.as_ref()));
    Ok(())
}

fn render_list(locations: &[ConfigLocation], source: Option<&NormalizedPath>) -> String {
    let mut out = format!("{}\n\n", "Known MCP Config Locations".bold());
    let mut found = 0;

    for location in locations {
        let exists = location.path.is_file();
        if exists {
            found += 1;
        }
        let state = if exists {
            "found".green()
        } else {
            "missing".dimmed()
        };
        let tag = if source == Some(&location.path.canonical()) {
            format!(" {}", "[source]".yellow().bold())
        } else {
            String::new()
        };
        out.push_str(&format!(
            "  {:<8} {:<28} {:<12} {}{}\n",
            state,
            location.application_id.cyan(),
            location.format.as_str(),
            location.path,
            tag
        ));
    }

    out.push_str(&format!(
        "\n{} {} of {} location(s) present.\n",
        "Total:".dimmed(),
        found,
        locations.len()
    ));
    out
}
