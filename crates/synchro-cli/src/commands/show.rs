//! Show command

use std::path::PathBuf;

use colored::Colorize;
use synchro_core::{load_source, resolve_source};
use synchro_format::ConfigLocation;
use synchro_model::{ServerSet, Transport};

use crate::cli::OutputFormat;
use crate::context::AppContext;
use crate::error::Result;

/// Run the show command
pub fn run_show(ctx: &AppContext, source: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let location = resolve_source(ctx.source_override(source).as_deref(), &ctx.catalog)?;
    let servers = load_source(&location)?;

    match format {
        OutputFormat::Text => print!("{}", render_text(&location, &servers)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&servers)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&servers)?),
    }
    Ok(())
}

fn render_text(location: &ConfigLocation, servers: &ServerSet) -> String {
    let mut out = format!("{} {}\n\n", "Source:".cyan(), location.path);

    for (name, entry) in servers.iter() {
        let target = match &entry.transport {
            Transport::Stdio { command, args, .. } if !args.is_empty() => {
                format!("{command} {}", args.join(" "))
            }
            transport => transport.endpoint().to_string(),
        };
        let state = if entry.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        out.push_str(&format!(
            "  {:<20} {:<15} {:<9} {}\n",
            name.bold(),
            entry.transport.label(),
            state,
            target
        ));
    }

    out.push_str(&format!("\n{}\n", format!("{} server(s)", servers.len()).green()));
    out
}
