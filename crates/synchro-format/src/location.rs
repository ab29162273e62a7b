//! Where an entry-set lives: file, format and section path.

use std::fmt;

use synchro_fs::NormalizedPath;

/// Serialization family and layout of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// JSON file whose entry-set key sits at the top level.
    JsonRoot,
    /// JSON file where the entry-set key coexists with unrelated settings.
    JsonNested,
    /// TOML file with one `[mcp_servers.<name>]` table per entry.
    Toml,
}

impl FormatKind {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::JsonRoot | Self::JsonNested)
    }

    /// Default section path for this format.
    pub fn default_section(&self) -> Vec<String> {
        match self {
            Self::Toml => vec!["mcp_servers".to_string()],
            Self::JsonRoot | Self::JsonNested => vec!["mcpServers".to_string()],
        }
    }

    /// Guess the format from a file extension. Unknown extensions are JSON.
    pub fn from_path(path: &NormalizedPath) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::JsonNested,
        }
    }

    /// Parse the spelling used in settings files: `json`, `json-nested`, `toml`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" | "json-root" => Some(Self::JsonRoot),
            "json-nested" => Some(Self::JsonNested),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonRoot => "json",
            Self::JsonNested => "json-nested",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system a catalog entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub application_id: String,
    pub platform: Platform,
    pub path: NormalizedPath,
    pub format: FormatKind,
    /// Key path from the document root to the entry-set object.
    pub section: Vec<String>,
}

impl ConfigLocation {
    /// Location with the format's default section key.
    pub fn new(
        application_id: impl Into<String>,
        platform: Platform,
        path: impl Into<NormalizedPath>,
        format: FormatKind,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            platform,
            path: path.into(),
            format,
            section: format.default_section(),
        }
    }

    /// Location for a file named directly by the user.
    pub fn for_path(path: impl Into<NormalizedPath>) -> Self {
        let path = path.into();
        let format = FormatKind::from_path(&path);
        Self::new("custom", Platform::current(), path, format)
    }

    pub fn with_section<S: Into<String>>(mut self, section: impl IntoIterator<Item = S>) -> Self {
        self.section = section.into_iter().map(Into::into).collect();
        self
    }

    /// Dotted section path, for messages.
    pub fn section_key(&self) -> String {
        self.section.join(".")
    }
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.application_id, self.path)
    }
}
