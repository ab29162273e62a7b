//! User settings
//!
//! Optional `synchro.toml` in the platform config directory:
//!
//! ```toml
//! source = "~/Library/Application Support/Claude/claude_desktop_config.json"
//! mounts = ["/Volumes/Backup/me"]
//! jobs = 4
//! mount_timeout_secs = 5
//!
//! [[extra_locations]]
//! application = "my-agent"
//! path = "{home}/.agent/mcp.json"
//! format = "json"
//! ```
//!
//! Command-line flags win over these values, which win over built-in
//! defaults. A missing file yields the defaults; a malformed one is an error.
//! A leading `~` in `source` and `mounts` stands for the home directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use synchro_format::FormatKind;
use tracing::debug;

use crate::error::{Error, Result};

/// Settings file name inside the config directory.
pub const SETTINGS_FILE: &str = "synchro.toml";

/// Upper bound for the default worker count.
pub const MAX_DEFAULT_JOBS: usize = 8;

/// Default mount probe deadline in seconds.
pub const DEFAULT_MOUNT_TIMEOUT_SECS: u64 = 5;

/// A location appended to the built-in catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraLocation {
    pub application: String,
    /// Literal path or template over `{home}`, `{appdata}`, `{config}`.
    pub path: String,
    /// `json`, `json-nested` or `toml`; guessed from the extension when absent.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub section: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub source: Option<PathBuf>,
    pub mounts: Vec<PathBuf>,
    pub jobs: Option<usize>,
    pub mount_timeout_secs: Option<u64>,
    pub extra_locations: Vec<ExtraLocation>,
}

impl Settings {
    /// `<config dir>/synchro/synchro.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("synchro").join(SETTINGS_FILE))
    }

    /// Load from `path`, or from [`Settings::default_path`] when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Settings {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let settings = Self::parse(&text).map_err(|message| Error::Settings {
            path: path.clone(),
            message,
        })?;
        let settings = match dirs::home_dir() {
            Some(home) => settings.expand_home(&home),
            None => settings,
        };
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse and validate settings text.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let settings: Self = toml::from_str(text).map_err(|e| e.message().to_string())?;

        if settings.jobs == Some(0) {
            return Err("jobs must be at least 1".to_string());
        }
        for extra in &settings.extra_locations {
            if extra.application.trim().is_empty() {
                return Err("extra_locations entry has an empty application".to_string());
            }
            if let Some(format) = &extra.format {
                if FormatKind::parse(format).is_none() {
                    return Err(format!(
                        "extra_locations entry '{}' has unknown format '{format}'",
                        extra.application
                    ));
                }
            }
        }
        Ok(settings)
    }

    /// Replace a leading `~` in `source` and `mounts` with `home`.
    pub fn expand_home(mut self, home: &Path) -> Self {
        self.source = self.source.map(|path| expand_tilde(path, home));
        self.mounts = self.mounts.into_iter().map(|path| expand_tilde(path, home)).collect();
        self
    }

    /// Worker count: configured value, else min(available parallelism, 8).
    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(default_jobs).max(1)
    }

    pub fn mount_timeout(&self) -> Duration {
        Duration::from_secs(self.mount_timeout_secs.unwrap_or(DEFAULT_MOUNT_TIMEOUT_SECS))
    }
}

fn expand_tilde(path: PathBuf, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path,
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_JOBS)
}
