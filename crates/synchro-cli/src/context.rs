//! Per-invocation context
//!
//! Settings are loaded once and the catalog snapshot is built from them;
//! commands receive both through [`AppContext`].

use std::path::{Path, PathBuf};

use synchro_core::{Catalog, Settings};
use synchro_fs::NormalizedPath;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub catalog: Catalog,
    pub verbose: bool,
}

impl AppContext {
    pub fn load(config: Option<&Path>, verbose: bool) -> Result<Self> {
        let settings = Settings::load(config)?;
        let catalog = Catalog::for_current_user()?.with_extra_locations(&settings.extra_locations);
        debug!(home = %catalog.home(), platform = %catalog.platform(), "catalog ready");
        Ok(Self {
            settings,
            catalog,
            verbose,
        })
    }

    /// Command-line source, else the settings' source.
    pub fn source_override(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.settings.source.clone())
    }

    /// Command-line mounts when given, else the settings' mounts.
    pub fn mounts(&self, flag: Vec<PathBuf>) -> Vec<PathBuf> {
        if flag.is_empty() {
            self.settings.mounts.clone()
        } else {
            flag
        }
    }
}

/// Mount paths in the catalog's path type.
pub fn normalize_all(paths: &[PathBuf]) -> Vec<NormalizedPath> {
    paths.iter().map(NormalizedPath::new).collect()
}
