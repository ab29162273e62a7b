use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use synchro_format::{ConfigLocation, DiffKind, FormatKind, Platform, WriteOptions, read, write};
use synchro_model::{RemoteType, ServerEntry, ServerSet, Transport};
use synchro_test_utils::TestHome;

fn location(home: &TestHome, rel: &str) -> ConfigLocation {
    ConfigLocation::for_path(home.path(rel))
}

fn filesystem_set() -> ServerSet {
    let mut set = ServerSet::new();
    set.insert(
        "filesystem",
        ServerEntry::new(Transport::stdio(
            "npx",
            ["-y", "@modelcontextprotocol/server-filesystem", "~/Data"],
        )),
    );
    set
}

#[test]
fn scenario_compact_json_target() {
    let home = TestHome::new();
    home.write("settings.json", r#"{"theme":"dark","mcpServers":{}}"#);

    let outcome = write(&location(&home, "settings.json"), &filesystem_set(), WriteOptions::default()).unwrap();

    assert!(outcome.written);
    assert_eq!(
        home.read("settings.json"),
        r#"{"theme":"dark","mcpServers":{"filesystem":{"command":"npx","args":["-y","@modelcontextprotocol/server-filesystem","~/Data"]}}}"#
    );
}

#[test]
fn unrelated_bytes_survive_merge() {
    let home = TestHome::new();
    let before = r#"{
    "selectedAuthType": "oauth-personal",
    "ui": {
        "theme": "GitHub",
        "hideTips": true,
        "layers": [1, 2, {"deep": {"deeper": null}}]
    },
    "mcpServers": {
        "stale": {"command": "old"}
    },
    "checkpointing": {"enabled": false}
}
"#;
    home.write(".gemini/settings.json", before);

    write(&location(&home, ".gemini/settings.json"), &filesystem_set(), WriteOptions::default()).unwrap();
    let after = home.read(".gemini/settings.json");

    let prefix_end = before.find("\"mcpServers\"").unwrap();
    assert_eq!(&after[..prefix_end], &before[..prefix_end]);
    let suffix = &before[before.find(",\n    \"checkpointing\"").unwrap()..];
    assert!(after.ends_with(suffix));

    let old: Value = serde_json::from_str(before).unwrap();
    let new: Value = serde_json::from_str(&after).unwrap();
    for key in ["selectedAuthType", "ui", "checkpointing"] {
        assert_eq!(old[key], new[key]);
    }
    assert_eq!(
        new["mcpServers"],
        json!({"filesystem": {"command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/Data"]}})
    );
}

#[test]
fn pretty_json_merge_output() {
    let home = TestHome::new();
    home.write(
        ".claude.json",
        "{\n  \"numStartups\": 4,\n  \"mcpServers\": {\n    \"old\": {\n      \"command\": \"x\"\n    }\n  },\n  \"tipsHistory\": {}\n}\n",
    );
    let mut set = filesystem_set();
    let mut remote = ServerEntry::new(Transport::remote(
        "https://mcp.example.com/mcp",
        Some(RemoteType::StreamableHttp),
    ));
    remote.enabled = false;
    set.insert("remote", remote);

    write(&location(&home, ".claude.json"), &set, WriteOptions::default()).unwrap();

    insta::assert_snapshot!(home.read(".claude.json"), @r###"
    {
      "numStartups": 4,
      "mcpServers": {
        "filesystem": {
          "command": "npx",
          "args": [
            "-y",
            "@modelcontextprotocol/server-filesystem",
            "~/Data"
          ]
        },
        "remote": {
          "type": "streamableHttp",
          "url": "https://mcp.example.com/mcp",
          "enabled": false
        }
      },
      "tipsHistory": {}
    }
    "###);
}

#[test]
fn scenario_toml_full_replacement() {
    let home = TestHome::new();
    home.write(
        ".codex/config.toml",
        "model = \"o3\"\n\n[mcp_servers.old]\ncommand = \"legacy\"\nargs = [\"serve\"]\n",
    );
    let loc = location(&home, ".codex/config.toml");
    assert_eq!(loc.format, FormatKind::Toml);

    let outcome = write(&loc, &filesystem_set(), WriteOptions::default()).unwrap();

    let kinds: Vec<_> = outcome.diffs.iter().map(|d| (d.name.as_str(), d.kind)).collect();
    assert_eq!(kinds, [("filesystem", DiffKind::Added), ("old", DiffKind::Removed)]);

    let text = home.read(".codex/config.toml");
    assert!(text.starts_with("model = \"o3\"\n"));
    assert!(!text.contains("[mcp_servers.old]"));
    assert!(text.contains("[mcp_servers.filesystem]"));

    let reread = read(&loc).unwrap();
    assert_eq!(reread.servers, filesystem_set());
}

#[test]
fn dry_run_leaves_bytes_and_mtime() {
    let home = TestHome::new();
    let before = "{\"mcpServers\": {\"old\": {\"command\": \"x\"}}}\n";
    home.write("mcp.json", before);
    let mtime = home.mtime("mcp.json");

    let outcome = write(
        &location(&home, "mcp.json"),
        &filesystem_set(),
        WriteOptions {
            dry_run: true,
            create_missing: false,
        },
    )
    .unwrap();

    assert!(outcome.changed);
    assert!(!outcome.written);
    assert!(outcome.preview.contains("+"));
    assert_eq!(home.read("mcp.json"), before);
    assert_eq!(home.mtime("mcp.json"), mtime);
}

#[test]
fn invalid_target_entry_is_replaced() {
    let home = TestHome::new();
    home.write(
        "mcp.json",
        r#"{"mcpServers": {"broken": {"args": ["x"]}, "filesystem": {"command": "npx"}}}"#,
    );
    let loc = location(&home, "mcp.json");

    let before = read(&loc).unwrap();
    assert_eq!(before.warnings.len(), 1);
    assert_eq!(before.warnings[0].name, "broken");

    let outcome = write(&loc, &filesystem_set(), WriteOptions::default()).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    let after = read(&loc).unwrap();
    assert!(after.warnings.is_empty());
    assert_eq!(after.servers, filesystem_set());
}

#[test]
fn nested_section_location() {
    let home = TestHome::new();
    home.write("settings.json", "{\n  \"mcp\": {\n    \"enabled\": true\n  }\n}\n");
    let loc = ConfigLocation::new(
        "editor",
        Platform::current(),
        home.path("settings.json"),
        FormatKind::JsonNested,
    )
    .with_section(["mcp", "servers"]);

    write(&loc, &filesystem_set(), WriteOptions::default()).unwrap();
    let value: Value = serde_json::from_str(&home.read("settings.json")).unwrap();
    assert_eq!(value["mcp"]["enabled"], json!(true));
    assert_eq!(read(&loc).unwrap().servers, filesystem_set());
}

#[test]
fn parse_error_leaves_file_untouched() {
    let home = TestHome::new();
    home.write("mcp.json", "{\"mcpServers\": ");
    let err = write(&location(&home, "mcp.json"), &filesystem_set(), WriteOptions::default()).unwrap_err();
    assert!(matches!(err, synchro_format::Error::Parse { .. }));
    assert_eq!(home.read("mcp.json"), "{\"mcpServers\": ");
}

#[test]
fn directory_in_place_of_target_is_a_read_error() {
    let home = TestHome::new();
    home.mkdir("mcp.json");
    let loc = location(&home, "mcp.json");
    let err = write(&loc, &filesystem_set(), WriteOptions::default()).unwrap_err();
    assert!(matches!(err, synchro_format::Error::Io(_)));
    assert!(home.path("mcp.json").is_dir());
}

#[cfg(unix)]
#[test]
fn write_failure_is_reported() {
    use std::os::unix::fs::PermissionsExt;

    if synchro_test_utils::is_root() {
        return;
    }
    let home = TestHome::new();
    home.write("locked/mcp.json", "{}");
    let dir = home.path("locked");
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555)).unwrap();

    let err = write(&location(&home, "locked/mcp.json"), &filesystem_set(), WriteOptions::default()).unwrap_err();
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(err, synchro_format::Error::Write { .. }), "{err:?}");
    assert_eq!(home.read("locked/mcp.json"), "{}");
}
