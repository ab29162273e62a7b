//! Schema command

use synchro_model::servers_schema;

use crate::error::Result;

/// Print the entry-set JSON schema to stdout.
pub fn run_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&servers_schema())?);
    Ok(())
}
