//! TOML entry-set tables through toml_edit.
//!
//! Entries live under `[mcp_servers.<name>]`. Keys are snake_case on disk and
//! camelCase in the canonical model; both spellings are accepted on read.

use serde_json::{Map, Value};
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table, Value as TomlValue};

/// Canonical key and its on-disk TOML spelling.
const RENAMES: &[(&str, &str)] = &[
    ("alwaysAllow", "always_allow"),
    ("httpHeaders", "http_headers"),
    ("bearerTokenEnvVar", "bearer_token_env_var"),
];

/// Map-valued keys written as `[mcp_servers.<name>.<key>]` sub-tables.
const SUB_TABLES: &[&str] = &["env", "http_headers"];

fn toml_key(canonical: &str) -> &str {
    RENAMES
        .iter()
        .find(|(camel, _)| *camel == canonical)
        .map_or(canonical, |(_, snake)| *snake)
}

fn canonical_key(on_disk: &str) -> &str {
    RENAMES
        .iter()
        .find(|(_, snake)| *snake == on_disk)
        .map_or(on_disk, |(camel, _)| *camel)
}

/// Read the section as a JSON object with canonical key spellings.
///
/// `Ok(None)` when the section is absent; `Err` carries the TOML kind found
/// where a table was required.
pub fn read_section(
    doc: &DocumentMut,
    section: &[String],
) -> Result<Option<Map<String, Value>>, &'static str> {
    let mut item = doc.as_item();
    for segment in section {
        if !item.is_table_like() {
            return Err(item_kind(item));
        }
        match item.get(segment.as_str()) {
            Some(next) => item = next,
            None => return Ok(None),
        }
    }
    if !item.is_table_like() {
        return Err(item_kind(item));
    }

    let Value::Object(raw) = item_to_json(item) else {
        return Ok(Some(Map::new()));
    };
    Ok(Some(
        raw.into_iter()
            .map(|(name, entry)| (name, canonical_entry(entry)))
            .collect(),
    ))
}

fn canonical_entry(entry: Value) -> Value {
    let Value::Object(fields) = entry else {
        return entry;
    };
    let mut out = Map::new();
    for (key, value) in fields {
        let canonical = canonical_key(&key);
        // An explicit camelCase key beats its snake_case spelling.
        if canonical != key && out.contains_key(canonical) {
            continue;
        }
        out.insert(canonical.to_string(), value);
    }
    Value::Object(out)
}

/// Replace every entry table under `section` with `entries`.
///
/// Tables for names that remain are cleared and refilled in place so their
/// position and header comments survive; tables for names no longer present
/// are removed.
pub fn write_section(doc: &mut DocumentMut, section: &[String], entries: &Map<String, Value>) {
    let mut table = doc.as_table_mut();
    for segment in section {
        let item = table.entry(segment.as_str()).or_insert(implicit_table());
        if !item.is_table() {
            *item = implicit_table();
        }
        let Some(next) = item.as_table_mut() else {
            return;
        };
        table = next;
    }

    let stale: Vec<String> = table
        .iter()
        .map(|(name, _)| name.to_string())
        .filter(|name| !entries.contains_key(name))
        .collect();
    for name in stale {
        table.remove(&name);
    }

    for (name, entry) in entries {
        let Value::Object(fields) = entry else {
            continue;
        };
        match table.get_mut(name.as_str()).and_then(Item::as_table_mut) {
            Some(existing) => {
                existing.clear();
                fill_entry(existing, fields);
            }
            None => {
                let mut fresh = Table::new();
                fill_entry(&mut fresh, fields);
                table.insert(name.as_str(), Item::Table(fresh));
            }
        }
    }
}

fn implicit_table() -> Item {
    let mut table = Table::new();
    table.set_implicit(true);
    Item::Table(table)
}

fn fill_entry(table: &mut Table, fields: &Map<String, Value>) {
    for (key, value) in fields {
        let key = toml_key(key);
        match value {
            Value::Object(map) if SUB_TABLES.contains(&key) => {
                let mut sub = Table::new();
                for (k, v) in map {
                    if let Some(v) = to_toml(v) {
                        sub.insert(k.as_str(), Item::Value(v));
                    }
                }
                table.insert(key, Item::Table(sub));
            }
            other => {
                if let Some(v) = to_toml(other) {
                    table.insert(key, Item::Value(v));
                }
            }
        }
    }
}

/// JSON to TOML. `null` has no TOML form and is dropped.
fn to_toml(value: &Value) -> Option<TomlValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(TomlValue::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(TomlValue::from)
            .or_else(|| n.as_f64().map(TomlValue::from)),
        Value::String(s) => Some(TomlValue::from(s.as_str())),
        Value::Array(items) => Some(TomlValue::Array(
            items.iter().filter_map(to_toml).collect::<Array>(),
        )),
        Value::Object(map) => {
            let mut inline = InlineTable::new();
            for (k, v) in map {
                if let Some(v) = to_toml(v) {
                    inline.insert(k.as_str(), v);
                }
            }
            Some(TomlValue::InlineTable(inline))
        }
    }
}

fn item_to_json(item: &Item) -> Value {
    match item {
        Item::Value(v) => value_to_json(v),
        Item::Table(t) => Value::Object(
            t.iter()
                .map(|(k, v)| (k.to_string(), item_to_json(v)))
                .collect(),
        ),
        Item::ArrayOfTables(arr) => Value::Array(
            arr.iter()
                .map(|t| {
                    Value::Object(
                        t.iter()
                            .map(|(k, v)| (k.to_string(), item_to_json(v)))
                            .collect(),
                    )
                })
                .collect(),
        ),
        Item::None => Value::Null,
    }
}

fn value_to_json(value: &TomlValue) -> Value {
    match value {
        TomlValue::String(s) => Value::String(s.value().to_string()),
        TomlValue::Integer(i) => Value::Number((*i.value()).into()),
        TomlValue::Float(f) => serde_json::Number::from_f64(*f.value())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TomlValue::Boolean(b) => Value::Bool(*b.value()),
        TomlValue::Datetime(d) => Value::String(d.value().to_string()),
        TomlValue::Array(arr) => Value::Array(arr.iter().map(value_to_json).collect()),
        TomlValue::InlineTable(t) => Value::Object(
            t.iter()
                .map(|(k, v)| (k.to_string(), value_to_json(v)))
                .collect(),
        ),
    }
}

fn item_kind(item: &Item) -> &'static str {
    match item {
        Item::None => "nothing",
        Item::Value(v) => v.type_name(),
        Item::Table(_) => "table",
        Item::ArrayOfTables(_) => "array of tables",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn servers() -> Vec<String> {
        vec!["mcp_servers".to_string()]
    }

    fn entries(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn reads_tables_with_canonical_keys() {
        let doc: DocumentMut = r#"
model = "o3"

[mcp_servers.docs]
url = "https://docs.test/mcp"
bearer_token_env_var = "DOCS_TOKEN"

[mcp_servers.fs]
command = "npx"
args = ["-y", "server-filesystem"]

[mcp_servers.fs.env]
ROOT = "/data"
"#
        .parse()
        .unwrap();

        let section = read_section(&doc, &servers()).unwrap().unwrap();
        assert_eq!(
            Value::Object(section),
            json!({
                "docs": {"url": "https://docs.test/mcp", "bearerTokenEnvVar": "DOCS_TOKEN"},
                "fs": {"command": "npx", "args": ["-y", "server-filesystem"], "env": {"ROOT": "/data"}}
            })
        );
    }

    #[test]
    fn missing_section_is_none() {
        let doc: DocumentMut = "model = \"o3\"\n".parse().unwrap();
        assert_eq!(read_section(&doc, &servers()), Ok(None));
    }

    #[test]
    fn scalar_section_is_rejected() {
        let doc: DocumentMut = "mcp_servers = 3\n".parse().unwrap();
        assert_eq!(read_section(&doc, &servers()), Err("integer"));
    }

    #[test]
    fn write_into_empty_document() {
        let mut doc = DocumentMut::new();
        write_section(
            &mut doc,
            &servers(),
            &entries(json!({
                "fs": {"command": "npx", "args": ["-y"], "env": {"ROOT": "/data"}},
                "docs": {"url": "https://docs.test/mcp", "alwaysAllow": ["search"]}
            })),
        );
        insta::assert_snapshot!(doc.to_string(), @r###"
        [mcp_servers.fs]
        command = "npx"
        args = ["-y"]

        [mcp_servers.fs.env]
        ROOT = "/data"

        [mcp_servers.docs]
        url = "https://docs.test/mcp"
        always_allow = ["search"]
        "###);
    }

    #[test]
    fn write_replaces_removes_and_keeps_other_tables() {
        let mut doc: DocumentMut = r#"# user settings
model = "o3"

[mcp_servers.old]
command = "old-server"

# keep this comment
[mcp_servers.fs]
command = "stale"

[features]
web_search = true
"#
        .parse()
        .unwrap();

        write_section(
            &mut doc,
            &servers(),
            &entries(json!({"fs": {"command": "npx"}})),
        );
        let out = doc.to_string();

        assert!(!out.contains("[mcp_servers.old]"));
        assert!(out.contains("# keep this comment\n[mcp_servers.fs]\ncommand = \"npx\"\n"));
        assert!(out.starts_with("# user settings\nmodel = \"o3\"\n"));
        assert!(out.contains("[features]\nweb_search = true\n"));
    }

    #[test]
    fn snake_and_camel_spellings_read_the_same() {
        let a: DocumentMut = "[mcp_servers.x]\nurl = \"https://h\"\nhttp_headers = { A = \"1\" }\n"
            .parse()
            .unwrap();
        let b: DocumentMut = "[mcp_servers.x]\nurl = \"https://h\"\nhttpHeaders = { A = \"1\" }\n"
            .parse()
            .unwrap();
        assert_eq!(
            read_section(&a, &servers()).unwrap(),
            read_section(&b, &servers()).unwrap()
        );
    }
}
