//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// synchro - Keep MCP server definitions in sync across AI apps and machines
#[derive(Parser, Debug)]
#[command(name = "synchro")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (default: <config dir>/synchro/synchro.toml)
    #[arg(long, global = true, env = "SYNCHRO_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List known MCP config locations
    List {
        /// Extra roots to search, comma separated (e.g. an external volume)
        #[arg(long, value_delimiter = ',', value_name = "PATHS")]
        mounts: Vec<PathBuf>,
    },

    /// Print the normalized server entries of a source file
    Show {
        /// Source config file (default: Claude Desktop)
        #[arg(long, value_name = "PATH")]
        source: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Copy the source server entries into every target
    ///
    /// Each target's server section is replaced; everything else in the
    /// file is left as it was.
    ///
    /// Examples:
    ///   synchro sync --dry-run -v             # Preview with file diffs
    ///   synchro sync --targets a.json,b.toml  # Only these files
    ///   synchro sync --mounts /Volumes/Old    # Also the copies on a volume
    Sync {
        /// Source config file (default: Claude Desktop)
        #[arg(long, value_name = "PATH")]
        source: Option<PathBuf>,

        /// Target files, comma separated; created when missing
        #[arg(long, value_delimiter = ',', value_name = "PATHS")]
        targets: Vec<PathBuf>,

        /// Extra roots to search, comma separated
        #[arg(long, value_delimiter = ',', value_name = "PATHS")]
        mounts: Vec<PathBuf>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Number of targets processed in parallel
        #[arg(short, long, value_parser = parse_jobs)]
        jobs: Option<usize>,
    },

    /// Check one config file and report every invalid entry
    Validate {
        /// Config file to check
        path: PathBuf,
    },

    /// Print the JSON schema of a server entry-set
    Schema,
}

fn parse_jobs(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Output format for `show`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}
