//! The validated server entry and its canonical map form.
//!
//! A [`ServerEntry`] can only be obtained through [`crate::parse_entry`] or by
//! constructing it directly; either way it always carries exactly one
//! [`Transport`]. The canonical map produced by
//! [`ServerEntry::to_canonical_map`] uses the JSON-family field names
//! (`alwaysAllow`, `httpHeaders`, `bearerTokenEnvVar`); per-format renaming is
//! the writer's concern.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

// ===========================================================================
// Canonical field names
// ===========================================================================

pub const COMMAND: &str = "command";
pub const ARGS: &str = "args";
pub const CWD: &str = "cwd";
pub const ENV: &str = "env";
pub const URL: &str = "url";
pub const TYPE: &str = "type";
pub const HTTP_HEADERS: &str = "httpHeaders";
pub const BEARER_TOKEN_ENV_VAR: &str = "bearerTokenEnvVar";
pub const ENABLED: &str = "enabled";
pub const DISABLED: &str = "disabled";
pub const ALWAYS_ALLOW: &str = "alwaysAllow";
pub const TIMEOUT: &str = "timeout";
pub const TRUST: &str = "trust";

/// Every field name the model interprets. Anything else is an extension field.
pub const KNOWN_FIELDS: &[&str] = &[
    COMMAND,
    ARGS,
    CWD,
    ENV,
    URL,
    TYPE,
    HTTP_HEADERS,
    BEARER_TOKEN_ENV_VAR,
    ENABLED,
    DISABLED,
    ALWAYS_ALLOW,
    TIMEOUT,
    TRUST,
];

/// `type` value marking a command-launched entry.
pub const STDIO_TYPE: &str = "stdio";

// ===========================================================================
// Transport
// ===========================================================================

/// Wire protocol of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteType {
    /// Server-Sent Events (legacy remote transport).
    Sse,
    /// Streamable HTTP. Accepts `streamable-http` and `streamableHttp`.
    StreamableHttp,
    /// Plain `http`, the spelling some clients use for streamable HTTP.
    Http,
}

impl RemoteType {
    /// Parse a `type` value, collapsing known aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sse" => Some(Self::Sse),
            "streamable-http" | "streamableHttp" => Some(Self::StreamableHttp),
            "http" => Some(Self::Http),
            _ => None,
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::StreamableHttp => "streamableHttp",
            Self::Http => "http",
        }
    }
}

impl std::fmt::Display for RemoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a server is reached. Exactly one variant is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Local process talking over stdin/stdout.
    Stdio {
        command: String,
        args: Vec<String>,
        cwd: Option<String>,
        env: Option<IndexMap<String, String>>,
        /// The entry spelled out `"type": "stdio"`; kept so output matches input.
        typed: bool,
    },
    /// Remote server reached by URL.
    Remote {
        url: String,
        kind: Option<RemoteType>,
        http_headers: Option<IndexMap<String, String>>,
        bearer_token_env_var: Option<String>,
    },
}

impl Transport {
    /// Stdio transport with just a command and arguments.
    pub fn stdio(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Stdio {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: None,
            typed: false,
        }
    }

    /// Remote transport with just a URL and optional protocol.
    pub fn remote(url: impl Into<String>, kind: Option<RemoteType>) -> Self {
        Self::Remote {
            url: url.into(),
            kind,
            http_headers: None,
            bearer_token_env_var: None,
        }
    }

    /// Short label used in listings: `stdio`, `sse`, `streamableHttp`, `http`, or `remote`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stdio { .. } => STDIO_TYPE,
            Self::Remote { kind: Some(kind), .. } => kind.as_str(),
            Self::Remote { kind: None, .. } => "remote",
        }
    }

    /// The command for stdio entries or the URL for remote ones.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Stdio { command, .. } => command,
            Self::Remote { url, .. } => url,
        }
    }
}

// ===========================================================================
// Entry
// ===========================================================================

/// One validated server declaration.
///
/// `enabled` is the only liveness flag; a legacy `disabled` input field has
/// already been folded into it by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEntry {
    pub transport: Transport,
    pub enabled: bool,
    /// Auto-approved tool names, de-duplicated, first occurrence order.
    pub always_allow: Option<Vec<String>>,
    /// Timeout in seconds.
    pub timeout: Option<u64>,
    pub trust: Option<bool>,
    /// Fields the model does not interpret, carried through verbatim.
    pub extra: Map<String, Value>,
}

impl ServerEntry {
    /// Entry with the given transport and every optional field at its default.
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            enabled: true,
            always_allow: None,
            timeout: None,
            trust: None,
            extra: Map::new(),
        }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self.transport, Transport::Stdio { .. })
    }

    /// Emit the canonical map: canonical field names only, defaults omitted,
    /// transport fields first and extension fields last.
    pub fn to_canonical_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        match &self.transport {
            Transport::Stdio {
                command,
                args,
                cwd,
                env,
                typed,
            } => {
                if *typed {
                    map.insert(TYPE.into(), json!(STDIO_TYPE));
                }
                map.insert(COMMAND.into(), json!(command));
                if !args.is_empty() {
                    map.insert(ARGS.into(), json!(args));
                }
                if let Some(cwd) = cwd {
                    map.insert(CWD.into(), json!(cwd));
                }
                if let Some(env) = env {
                    map.insert(ENV.into(), string_map(env));
                }
            }
            Transport::Remote {
                url,
                kind,
                http_headers,
                bearer_token_env_var,
            } => {
                if let Some(kind) = kind {
                    map.insert(TYPE.into(), json!(kind.as_str()));
                }
                map.insert(URL.into(), json!(url));
                if let Some(headers) = http_headers {
                    map.insert(HTTP_HEADERS.into(), string_map(headers));
                }
                if let Some(var) = bearer_token_env_var {
                    map.insert(BEARER_TOKEN_ENV_VAR.into(), json!(var));
                }
            }
        }

        if !self.enabled {
            map.insert(ENABLED.into(), json!(false));
        }
        if let Some(allow) = &self.always_allow {
            map.insert(ALWAYS_ALLOW.into(), json!(allow));
        }
        if let Some(timeout) = self.timeout {
            map.insert(TIMEOUT.into(), json!(timeout));
        }
        if let Some(trust) = self.trust {
            map.insert(TRUST.into(), json!(trust));
        }

        for (key, value) in &self.extra {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }

        map
    }
}

fn string_map(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

impl Serialize for ServerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_canonical_map().serialize(serializer)
    }
}
