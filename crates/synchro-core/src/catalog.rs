//! Location Catalog
//!
//! The built-in table of known config files, resolved for one platform and
//! one home directory. A [`Catalog`] is an immutable snapshot built once per
//! invocation and handed to the orchestrator; nothing here is global.
//!
//! # Path templates
//!
//! Paths are written over three placeholders:
//!
//! | Placeholder | Linux | macOS | Windows |
//! |---|---|---|---|
//! | `{home}` | base | base | base |
//! | `{appdata}` | `base/.config` | `base/Library/Application Support` | `%APPDATA%` or `base/AppData/Roaming` |
//! | `{config}` | `base/.config` | `base/.config` | same as `{appdata}` |
//!
//! `base` is the home directory, or a mount root when a catalog entry is
//! re-rooted under an external volume. `%APPDATA%` is only honoured for the
//! home directory itself.

use synchro_format::{ConfigLocation, FormatKind, Platform};
use synchro_fs::NormalizedPath;

use crate::error::{Error, Result};
use crate::settings::ExtraLocation;

/// Application whose config is the default sync source.
pub const DEFAULT_SOURCE: &str = "claude-desktop";

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub application_id: String,
    pub template: String,
    pub format: FormatKind,
    /// Section override; `None` uses the format's default key.
    pub section: Option<Vec<String>>,
}

impl CatalogEntry {
    pub fn new(application_id: impl Into<String>, template: impl Into<String>, format: FormatKind) -> Self {
        Self {
            application_id: application_id.into(),
            template: template.into(),
            format,
            section: None,
        }
    }
}

const VSCODE_FAMILY: &[(&str, &str)] = &[
    ("vscode", "Code"),
    ("vscode-insiders", "Code - Insiders"),
    ("cursor", "Cursor"),
    ("antigravity", "Antigravity"),
];

const EXTENSIONS: &[(&str, &str)] = &[
    ("kilo-code", "kilocode.kilo-code"),
    ("roo-code", "rooveterinaryinc.roo-cline"),
];

/// The built-in rows, in declaration order.
pub fn builtin_entries() -> Vec<CatalogEntry> {
    use FormatKind::{JsonNested, JsonRoot, Toml};

    let mut entries = vec![
        CatalogEntry::new(DEFAULT_SOURCE, "{appdata}/Claude/claude_desktop_config.json", JsonRoot),
        CatalogEntry::new("claude-code", "{home}/.claude.json", JsonNested),
        CatalogEntry::new("cursor", "{home}/.cursor/mcp.json", JsonRoot),
        CatalogEntry::new("boltai", "{home}/.boltai/mcp.json", JsonRoot),
        CatalogEntry::new("gemini-cli", "{home}/.gemini/settings.json", JsonNested),
        CatalogEntry::new("codex-cli", "{home}/.codex/config.toml", Toml),
        CatalogEntry::new("jan", "{home}/jan/mcp_config.json", JsonRoot),
        CatalogEntry::new("factory", "{home}/.factory/mcp.json", JsonRoot),
        CatalogEntry::new("void-editor", "{home}/.void-editor/mcp.json", JsonRoot),
        CatalogEntry::new("llxprt", "{home}/.llxprt/settings.json", JsonNested),
        CatalogEntry::new("qwen", "{home}/.qwen/settings.json", JsonNested),
        CatalogEntry::new("gemini-antigravity", "{home}/.gemini/antigravity/mcp_config.json", JsonRoot),
    ];

    for (host_id, host_dir) in VSCODE_FAMILY {
        for (ext_id, ext_dir) in EXTENSIONS {
            entries.push(CatalogEntry::new(
                format!("{ext_id}-{host_id}"),
                format!("{{appdata}}/{host_dir}/User/globalStorage/{ext_dir}/settings/mcp_settings.json"),
                JsonRoot,
            ));
        }
    }

    entries
}

/// Directories substituted into templates for one base.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Roots {
    home: NormalizedPath,
    appdata: NormalizedPath,
    config: NormalizedPath,
}

impl Roots {
    fn for_base(base: &NormalizedPath, platform: Platform, appdata_override: Option<&NormalizedPath>) -> Self {
        let (appdata, config) = match platform {
            Platform::Linux => (base.join(".config"), base.join(".config")),
            Platform::MacOs => (base.join("Library/Application Support"), base.join(".config")),
            Platform::Windows => {
                let appdata = appdata_override
                    .cloned()
                    .unwrap_or_else(|| base.join("AppData/Roaming"));
                (appdata.clone(), appdata)
            }
        };
        Self {
            home: base.clone(),
            appdata,
            config,
        }
    }

    fn expand(&self, template: &str) -> NormalizedPath {
        let expanded = template
            .replace("{home}", self.home.as_str())
            .replace("{appdata}", self.appdata.as_str())
            .replace("{config}", self.config.as_str());
        NormalizedPath::new(expanded)
    }
}

fn has_placeholder(template: &str) -> bool {
    ["{home}", "{appdata}", "{config}"]
        .iter()
        .any(|p| template.contains(p))
}

/// Immutable snapshot of known locations for one user on one platform.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    platform: Platform,
    home: NormalizedPath,
    appdata_override: Option<NormalizedPath>,
}

impl Catalog {
    /// Built-in catalog rooted at `home`.
    pub fn new(home: impl Into<NormalizedPath>, platform: Platform) -> Self {
        Self {
            entries: builtin_entries(),
            platform,
            home: home.into(),
            appdata_override: None,
        }
    }

    /// Built-in catalog for the current user and platform.
    ///
    /// On Windows `%APPDATA%` replaces the default roaming directory.
    pub fn for_current_user() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHome)?;
        let platform = Platform::current();
        let mut catalog = Self::new(home, platform);
        if platform == Platform::Windows {
            catalog.appdata_override = std::env::var_os("APPDATA")
                .filter(|v| !v.is_empty())
                .map(|v| NormalizedPath::new(std::path::PathBuf::from(v)));
        }
        Ok(catalog)
    }

    /// Append user-declared locations from settings.
    pub fn with_extra_locations(mut self, extras: &[ExtraLocation]) -> Self {
        for extra in extras {
            let format = extra
                .format
                .as_deref()
                .and_then(FormatKind::parse)
                .unwrap_or_else(|| FormatKind::from_path(&NormalizedPath::new(&extra.path)));
            self.entries.push(CatalogEntry {
                application_id: extra.application.clone(),
                template: extra.path.clone(),
                format,
                section: extra.section.clone(),
            });
        }
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn home(&self) -> &NormalizedPath {
        &self.home
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Every catalog location under the home directory.
    pub fn locations(&self) -> Vec<ConfigLocation> {
        let roots = Roots::for_base(&self.home, self.platform, self.appdata_override.as_ref());
        self.entries
            .iter()
            .map(|entry| self.locate(entry, roots.expand(&entry.template)))
            .collect()
    }

    /// Every catalog location re-rooted under `mount`.
    ///
    /// Templated paths are expanded with the mount as base. A literal path is
    /// moved from under the home directory to under the mount, and dropped
    /// when it does not live under the home directory.
    pub fn locations_under(&self, mount: &NormalizedPath) -> Vec<ConfigLocation> {
        let roots = Roots::for_base(mount, self.platform, None);
        self.entries
            .iter()
            .filter_map(|entry| {
                let path = if has_placeholder(&entry.template) {
                    roots.expand(&entry.template)
                } else {
                    NormalizedPath::new(&entry.template).rebase(&self.home, mount)?
                };
                Some(self.locate(entry, path))
            })
            .collect()
    }

    /// Home locations followed by the locations under each mount.
    pub fn discover(&self, mounts: &[NormalizedPath]) -> Vec<ConfigLocation> {
        let mut all = self.locations();
        for mount in mounts {
            all.extend(self.locations_under(mount));
        }
        all
    }

    /// Location of the default source application.
    pub fn default_source(&self) -> Option<ConfigLocation> {
        self.locations()
            .into_iter()
            .find(|location| location.application_id == DEFAULT_SOURCE)
    }

    fn locate(&self, entry: &CatalogEntry, path: NormalizedPath) -> ConfigLocation {
        let location = ConfigLocation::new(entry.application_id.clone(), self.platform, path, entry.format);
        match &entry.section {
            Some(section) => location.with_section(section.iter().cloned()),
            None => location,
        }
    }
}
