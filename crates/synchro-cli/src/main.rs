//! synchro CLI
//!
//! Reads the MCP server entries of one source config and writes them into
//! every other AI client's config file.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::sync::SyncArgs;
use context::AppContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} MCP config synchronizer", "synchro".green().bold());
        println!();
        println!("Run {} for available commands.", "synchro --help".cyan());
        return Ok(());
    };

    execute_command(command, cli.config.as_deref(), cli.verbose)
}

fn execute_command(cmd: Commands, config: Option<&std::path::Path>, verbose: bool) -> Result<()> {
    match cmd {
        // Neither needs settings or a home directory.
        Commands::Schema => commands::run_schema(),
        Commands::Validate { path } => commands::run_validate(&path),
        Commands::List { mounts } => {
            let ctx = AppContext::load(config, verbose)?;
            commands::run_list(&ctx, mounts)
        }
        Commands::Show { source, format } => {
            let ctx = AppContext::load(config, verbose)?;
            commands::run_show(&ctx, source, format)
        }
        Commands::Sync {
            source,
            targets,
            mounts,
            dry_run,
            jobs,
        } => {
            let ctx = AppContext::load(config, verbose)?;
            commands::run_sync(
                &ctx,
                SyncArgs {
                    source,
                    targets,
                    mounts,
                    dry_run,
                    jobs,
                },
            )
        }
    }
}
