//! Validate command

use std::path::Path;

use colored::Colorize;
use synchro_format::{ConfigLocation, Error as FormatError, ReadOutcome, read};

use crate::error::{CliError, Result};

/// Run the validate command
///
/// Every invalid entry is reported; the command fails if there is at least one.
pub fn run_validate(path: &Path) -> Result<()> {
    let location = ConfigLocation::for_path(path);
    let outcome = match read(&location) {
        Ok(outcome) => outcome,
        Err(FormatError::NotFound { .. }) => {
            return Err(CliError::user(format!("File not found: {}", path.display())));
        }
        Err(e) => return Err(e.into()),
    };

    print!("{}", render_outcome(&location, &outcome));

    match outcome.warnings.len() {
        0 => Ok(()),
        1 => Err(CliError::user("1 invalid entry")),
        n => Err(CliError::user(format!("{n} invalid entries"))),
    }
}

fn render_outcome(location: &ConfigLocation, outcome: &ReadOutcome) -> String {
    if outcome.raw_section.is_none() {
        return format!(
            "{} no '{}' section in {}\n",
            "warning:".yellow().bold(),
            location.section_key(),
            location.path
        );
    }

    let valid = outcome.servers.len();
    let mut out = if outcome.warnings.is_empty() {
        format!("{}\n", format!("Valid config with {valid} server(s)").green())
    } else {
        format!(
            "{} valid, {} invalid server(s) in {}\n",
            valid,
            outcome.warnings.len().to_string().red().bold(),
            location.path
        )
    };

    for (name, entry) in outcome.servers.iter() {
        let state = if entry.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        out.push_str(&format!("  - {}: {} {}\n", name, entry.transport.label(), state));
    }
    for warning in &outcome.warnings {
        out.push_str(&format!("  {} {}\n", "x".red().bold(), warning));
    }
    out
}
