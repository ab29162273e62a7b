use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use synchro_model::{RemoteType, ServerEntry, ServerSet, Transport, parse_entry, parse_entry_value};

#[test]
fn canonical_map_reparses_to_same_entry() {
    let raw = json!({
        "command": "docker",
        "args": ["run", "-i", "--rm", "ghcr.io/github/github-mcp-server"],
        "env": {"GITHUB_PERSONAL_ACCESS_TOKEN": "<token>"},
        "disabled": true,
        "alwaysAllow": ["get_issue"],
        "timeout": 60,
        "description": "GitHub"
    });
    let entry = parse_entry_value(&raw).unwrap();
    let again = parse_entry(&entry.to_canonical_map()).unwrap();
    assert_eq!(entry, again);
    assert_eq!(
        Value::Object(entry.to_canonical_map()),
        json!({
            "command": "docker",
            "args": ["run", "-i", "--rm", "ghcr.io/github/github-mcp-server"],
            "env": {"GITHUB_PERSONAL_ACCESS_TOKEN": "<token>"},
            "enabled": false,
            "alwaysAllow": ["get_issue"],
            "timeout": 60,
            "description": "GitHub"
        })
    );
}

#[test]
fn validation_error_names_the_entry() {
    let section = json!({
        "ok": {"command": "uvx", "args": ["mcp-server-time"]},
        "stale": {"env": {"A": "b"}}
    });
    let Value::Object(section) = section else {
        unreachable!()
    };
    let (set, invalid) = ServerSet::from_raw(&section);
    assert_eq!(set.len(), 1);
    assert_eq!(invalid.len(), 1);
    let err = invalid[0].error.clone().within(&invalid[0].name);
    assert_eq!(err.to_string(), "stale: entry must declare either 'command' or 'url'");
}

fn string_map() -> impl Strategy<Value = Option<indexmap::IndexMap<String, String>>> {
    proptest::option::of(proptest::collection::vec(("[A-Z_]{1,8}", "[ -~]{0,12}"), 0..4).prop_map(
        |pairs| pairs.into_iter().collect(),
    ))
}

fn transport() -> impl Strategy<Value = Transport> {
    let stdio = (
        "[a-z][a-z0-9-]{0,10}",
        proptest::collection::vec("[ -~]{0,12}", 0..5),
        proptest::option::of("/[a-z]{1,8}"),
        string_map(),
        any::<bool>(),
    )
        .prop_map(|(command, args, cwd, env, typed)| Transport::Stdio {
            command,
            args,
            cwd,
            env,
            typed,
        });
    let remote = (
        "https://[a-z]{1,10}\\.test/[a-z]{0,6}",
        proptest::option::of(prop_oneof![
            Just(RemoteType::Sse),
            Just(RemoteType::StreamableHttp),
            Just(RemoteType::Http),
        ]),
        string_map(),
        proptest::option::of("[A-Z_]{1,10}"),
    )
        .prop_map(|(url, kind, http_headers, bearer_token_env_var)| Transport::Remote {
            url,
            kind,
            http_headers,
            bearer_token_env_var,
        });
    prop_oneof![stdio, remote]
}

fn entry() -> impl Strategy<Value = ServerEntry> {
    (
        transport(),
        any::<bool>(),
        proptest::option::of(proptest::collection::vec("[a-z_]{1,8}", 0..4)),
        proptest::option::of(0u64..100_000),
        proptest::option::of(any::<bool>()),
        proptest::option::of("[ -~]{0,16}"),
    )
        .prop_map(|(transport, enabled, allow, timeout, trust, note)| {
            let mut entry = ServerEntry::new(transport);
            entry.enabled = enabled;
            entry.always_allow = allow.map(|mut names| {
                let mut seen = Vec::new();
                names.retain(|n| {
                    let fresh = !seen.contains(n);
                    seen.push(n.clone());
                    fresh
                });
                names
            });
            entry.timeout = timeout;
            entry.trust = trust;
            if let Some(note) = note {
                entry.extra.insert("description".into(), Value::String(note));
            }
            entry
        })
}

proptest! {
    #[test]
    fn canonical_form_round_trips(entry in entry()) {
        let map: Map<String, Value> = entry.to_canonical_map();
        let parsed = parse_entry(&map).unwrap();
        prop_assert_eq!(parsed, entry);
    }

    #[test]
    fn canonical_form_has_no_legacy_fields(entry in entry()) {
        let map = entry.to_canonical_map();
        prop_assert!(!map.contains_key("disabled"));
        prop_assert!(!(map.contains_key("command") && map.contains_key("url")));
    }
}
