//! Raw map to [`ServerEntry`] normalization.
//!
//! Normalization happens before validation:
//!
//! - `enabled` and `disabled` both present: `enabled` wins, `disabled` is ignored
//!   (not even type-checked).
//! - only `disabled` present: `enabled = !disabled`.
//! - neither present: `enabled = true`.
//! - `type` synonyms collapse through [`RemoteType::parse`].
//! - `args` given as a bare string becomes a one-element list.
//!
//! A JSON `null` on a known field is treated as if the field were absent.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::entry::*;
use crate::error::ValidationError;

type Result<T> = std::result::Result<T, ValidationError>;

/// Parse an untyped value, failing unless it is an object.
pub fn parse_entry_value(raw: &Value) -> Result<ServerEntry> {
    match raw {
        Value::Object(map) => parse_entry(map),
        other => Err(ValidationError::entry(format!(
            "entry must be an object, found {}",
            kind_of(other)
        ))),
    }
}

/// Validate and normalize one raw entry map.
pub fn parse_entry(raw: &Map<String, Value>) -> Result<ServerEntry> {
    let command = present(raw, COMMAND);
    let url = present(raw, URL);

    let transport = match (command, url) {
        (Some(_), Some(_)) => {
            return Err(ValidationError::new(
                COMMAND,
                "entry declares both 'command' and 'url'; exactly one transport is allowed",
            ));
        }
        (None, None) => {
            return Err(ValidationError::entry(
                "entry must declare either 'command' or 'url'",
            ));
        }
        (Some(command), None) => parse_stdio(raw, command)?,
        (None, Some(url)) => parse_remote(raw, url)?,
    };

    let mut entry = ServerEntry::new(transport);
    entry.enabled = parse_enabled(raw)?;

    if let Some(value) = present(raw, ALWAYS_ALLOW) {
        let mut names: Vec<String> = Vec::new();
        for name in string_list(ALWAYS_ALLOW, value, false)? {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        entry.always_allow = Some(names);
    }

    if let Some(value) = present(raw, TIMEOUT) {
        entry.timeout = Some(
            value
                .as_u64()
                .ok_or_else(|| ValidationError::new(TIMEOUT, "must be a non-negative integer"))?,
        );
    }

    if let Some(value) = present(raw, TRUST) {
        entry.trust = Some(boolean(TRUST, value)?);
    }

    let transport_fields: &[&str] = if entry.is_stdio() {
        &[COMMAND, ARGS, CWD, ENV, TYPE]
    } else {
        &[URL, TYPE, HTTP_HEADERS, BEARER_TOKEN_ENV_VAR]
    };
    for (key, value) in raw {
        let interpreted = KNOWN_FIELDS.contains(&key.as_str())
            && (!is_transport_field(key) || transport_fields.contains(&key.as_str()));
        if !interpreted {
            entry.extra.insert(key.clone(), value.clone());
        }
    }

    Ok(entry)
}

fn is_transport_field(key: &str) -> bool {
    matches!(
        key,
        COMMAND | ARGS | CWD | ENV | URL | TYPE | HTTP_HEADERS | BEARER_TOKEN_ENV_VAR
    )
}

fn parse_stdio(raw: &Map<String, Value>, command: &Value) -> Result<Transport> {
    let command = non_empty_string(COMMAND, command)?;

    let typed = match present(raw, TYPE) {
        None => false,
        Some(value) => {
            let kind = string(TYPE, value)?;
            if kind == STDIO_TYPE {
                true
            } else if RemoteType::parse(&kind).is_some() {
                return Err(ValidationError::new(
                    TYPE,
                    format!("remote type '{kind}' is not valid on a command entry"),
                ));
            } else {
                return Err(ValidationError::new(
                    TYPE,
                    format!("unknown transport type '{kind}'"),
                ));
            }
        }
    };

    let args = match present(raw, ARGS) {
        Some(value) => string_list(ARGS, value, true)?,
        None => Vec::new(),
    };
    let cwd = present(raw, CWD).map(|v| string(CWD, v)).transpose()?;
    let env = present(raw, ENV).map(|v| string_map(ENV, v)).transpose()?;

    Ok(Transport::Stdio {
        command,
        args,
        cwd,
        env,
        typed,
    })
}

fn parse_remote(raw: &Map<String, Value>, url: &Value) -> Result<Transport> {
    let url = non_empty_string(URL, url)?;

    let kind = match present(raw, TYPE) {
        None => None,
        Some(value) => {
            let kind = string(TYPE, value)?;
            if kind == STDIO_TYPE {
                return Err(ValidationError::new(
                    TYPE,
                    "type 'stdio' requires 'command', not 'url'",
                ));
            }
            Some(RemoteType::parse(&kind).ok_or_else(|| {
                ValidationError::new(TYPE, format!("unknown transport type '{kind}'"))
            })?)
        }
    };

    let http_headers = present(raw, HTTP_HEADERS)
        .map(|v| string_map(HTTP_HEADERS, v))
        .transpose()?;
    let bearer_token_env_var = present(raw, BEARER_TOKEN_ENV_VAR)
        .map(|v| non_empty_string(BEARER_TOKEN_ENV_VAR, v))
        .transpose()?;

    Ok(Transport::Remote {
        url,
        kind,
        http_headers,
        bearer_token_env_var,
    })
}

fn parse_enabled(raw: &Map<String, Value>) -> Result<bool> {
    match (present(raw, ENABLED), present(raw, DISABLED)) {
        (Some(enabled), _) => boolean(ENABLED, enabled),
        (None, Some(disabled)) => Ok(!boolean(DISABLED, disabled)?),
        (None, None) => Ok(true),
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn present<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

fn string(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::new(field, format!("must be a string, found {}", kind_of(value))))
}

fn non_empty_string(field: &str, value: &Value) -> Result<String> {
    let text = string(field, value)?;
    if text.trim().is_empty() {
        return Err(ValidationError::new(field, "must be a non-empty string"));
    }
    Ok(text)
}

fn boolean(field: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::new(field, format!("must be a boolean, found {}", kind_of(value))))
}

fn string_list(field: &str, value: &Value, allow_scalar: bool) -> Result<Vec<String>> {
    match value {
        Value::String(single) if allow_scalar => Ok(vec![single.clone()]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| string(&format!("{field}[{i}]"), item))
            .collect(),
        other => Err(ValidationError::new(
            field,
            format!("must be an array of strings, found {}", kind_of(other)),
        )),
    }
}

fn string_map(field: &str, value: &Value) -> Result<IndexMap<String, String>> {
    let Value::Object(map) = value else {
        return Err(ValidationError::new(
            field,
            format!("must be an object, found {}", kind_of(value)),
        ));
    };
    map.iter()
        .map(|(key, v)| Ok((key.clone(), string(&format!("{field}.{key}"), v)?)))
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn parse(value: Value) -> Result<ServerEntry> {
        parse_entry_value(&value)
    }

    #[test]
    fn stdio_entry() {
        let entry = parse(json!({
            "command": "npx",
            "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/Data"],
            "env": {"ROOT": "/tmp"}
        }))
        .unwrap();

        match &entry.transport {
            Transport::Stdio { command, args, env, typed, .. } => {
                assert_eq!(command, "npx");
                assert_eq!(args.len(), 3);
                assert_eq!(env.as_ref().unwrap()["ROOT"], "/tmp");
                assert!(!typed);
            }
            other => panic!("expected stdio, got {other:?}"),
        }
        assert!(entry.enabled);
        assert!(entry.extra.is_empty());
    }

    #[test]
    fn remote_entry_with_headers() {
        let entry = parse(json!({
            "url": "https://mcp.example.com/mcp",
            "type": "streamable-http",
            "httpHeaders": {"X-Api-Key": "abc"},
            "bearerTokenEnvVar": "EXAMPLE_TOKEN"
        }))
        .unwrap();
        assert_eq!(
            entry.transport,
            Transport::Remote {
                url: "https://mcp.example.com/mcp".into(),
                kind: Some(RemoteType::StreamableHttp),
                http_headers: Some(IndexMap::from([("X-Api-Key".into(), "abc".into())])),
                bearer_token_env_var: Some("EXAMPLE_TOKEN".into()),
            }
        );
    }

    #[rstest]
    #[case(json!({"command": "x", "disabled": true}), false)]
    #[case(json!({"command": "x", "enabled": false}), false)]
    #[case(json!({"command": "x", "disabled": false}), true)]
    #[case(json!({"command": "x"}), true)]
    #[case(json!({"command": "x", "enabled": true, "disabled": true}), true)]
    #[case(json!({"command": "x", "enabled": false, "disabled": "junk"}), false)]
    fn liveness_normalization(#[case] raw: Value, #[case] expected: bool) {
        assert_eq!(parse(raw).unwrap().enabled, expected);
    }

    #[test]
    fn disabled_and_enabled_false_are_identical() {
        let a = parse(json!({"command": "x", "disabled": true})).unwrap();
        let b = parse(json!({"command": "x", "enabled": false})).unwrap();
        assert_eq!(a, b);
        assert!(!a.to_canonical_map().contains_key("disabled"));
    }

    #[test]
    fn type_aliases_are_identical() {
        let a = parse(json!({"url": "https://h/mcp", "type": "streamable-http"})).unwrap();
        let b = parse(json!({"url": "https://h/mcp", "type": "streamableHttp"})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_canonical_map()["type"], json!("streamableHttp"));
    }

    #[rstest]
    #[case(json!({"command": "x", "url": "https://h"}), "command")]
    #[case(json!({"args": ["a"]}), "")]
    #[case(json!({"command": ""}), "command")]
    #[case(json!({"command": 42}), "command")]
    #[case(json!({"url": "   "}), "url")]
    #[case(json!({"command": "x", "args": ["a", 2]}), "args[1]")]
    #[case(json!({"command": "x", "args": {"a": 1}}), "args")]
    #[case(json!({"command": "x", "alwaysAllow": ["read", false]}), "alwaysAllow[1]")]
    #[case(json!({"command": "x", "alwaysAllow": "read"}), "alwaysAllow")]
    #[case(json!({"command": "x", "timeout": -1}), "timeout")]
    #[case(json!({"command": "x", "timeout": 1.5}), "timeout")]
    #[case(json!({"command": "x", "timeout": "30"}), "timeout")]
    #[case(json!({"command": "x", "env": {"KEY": 1}}), "env.KEY")]
    #[case(json!({"command": "x", "env": ["KEY=1"]}), "env")]
    #[case(json!({"command": "x", "enabled": "yes"}), "enabled")]
    #[case(json!({"command": "x", "disabled": 1}), "disabled")]
    #[case(json!({"command": "x", "trust": "always"}), "trust")]
    #[case(json!({"command": "x", "type": "sse"}), "type")]
    #[case(json!({"url": "https://h", "type": "stdio"}), "type")]
    #[case(json!({"url": "https://h", "type": "websocket"}), "type")]
    #[case(json!({"url": "https://h", "httpHeaders": {"A": true}}), "httpHeaders.A")]
    fn rejects_invalid_shapes(#[case] raw: Value, #[case] field: &str) {
        let err = parse(raw).unwrap_err();
        assert_eq!(err.field, field, "unexpected error: {err}");
    }

    #[test]
    fn non_object_entry_is_rejected() {
        let err = parse(json!(["npx"])).unwrap_err();
        assert_eq!(err.field, "");
        assert!(err.reason.contains("array"));
    }

    #[test]
    fn args_string_becomes_list() {
        let entry = parse(json!({"command": "uvx", "args": "mcp-server-git"})).unwrap();
        assert_eq!(entry.transport, Transport::stdio("uvx", ["mcp-server-git"]));
    }

    #[test]
    fn null_fields_count_as_absent() {
        let entry = parse(json!({"command": "x", "url": null, "timeout": null})).unwrap();
        assert!(entry.is_stdio());
        assert_eq!(entry.timeout, None);
    }

    #[test]
    fn always_allow_deduplicates_in_order() {
        let entry = parse(json!({
            "command": "x",
            "alwaysAllow": ["read", "write", "read"]
        }))
        .unwrap();
        assert_eq!(entry.always_allow.unwrap(), ["read", "write"]);
    }

    #[test]
    fn stdio_type_marker_is_kept() {
        let entry = parse(json!({"type": "stdio", "command": "x"})).unwrap();
        assert_eq!(
            Value::Object(entry.to_canonical_map()),
            json!({"type": "stdio", "command": "x"})
        );
    }

    #[test]
    fn unknown_fields_are_preserved_in_order() {
        let entry = parse(json!({
            "command": "x",
            "description": "files",
            "autoApprove": ["list"],
            "httpHeaders": {"ignored": "on stdio"}
        }))
        .unwrap();
        let keys: Vec<_> = entry.extra.keys().cloned().collect();
        assert_eq!(keys, ["description", "autoApprove", "httpHeaders"]);
    }
}
