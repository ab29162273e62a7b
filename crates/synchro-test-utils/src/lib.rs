//! Shared test utilities for the synchro workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`home`]: [`home::TestHome`], a scratch directory standing in for a
//!   user's home, with helpers to lay out config files and inspect them.

pub mod home;

pub use home::TestHome;

/// Sample source entry-set used across suites.
pub const FILESYSTEM_SOURCE: &str = r#"{
  "mcpServers": {
    "filesystem": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/Data"]
    }
  }
}
"#;

/// Whether the tests run as root, where permission checks do not apply.
pub fn is_root() -> bool {
    match std::process::Command::new("id").arg("-u").output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
        Err(_) => false,
    }
}
