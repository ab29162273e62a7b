//! End-to-end sync scenarios
//!
//! These exercise the full stack: catalog -> source load -> orchestrated
//! merge -> re-read, against a scratch home laid out like a real user's.

use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::Value;
use synchro_core::{Catalog, Orchestrator, SyncRequest, SyncStatus, load_source};
use synchro_format::{ConfigLocation, Platform, read};
use synchro_model::ServerSet;
use synchro_test_utils::TestHome;

const SOURCE: &str = r#"{
  "mcpServers": {
    "filesystem": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/Data"],
      "env": {"LOG_LEVEL": "info"}
    },
    "search": {
      "type": "streamable-http",
      "url": "https://search.example/mcp",
      "disabled": true,
      "httpHeaders": {"X-Api-Key": "abc"}
    },
    "notes": {
      "command": "uvx",
      "args": "notes-mcp",
      "alwaysAllow": ["read", "read", "list"],
      "timeout": 30,
      "description": "Personal notes"
    }
  }
}
"#;

const CLAUDE_CODE: &str = r#"{
  "numStartups": 12,
  "theme": "dark",
  "projects": {
    "/work/app": {
      "allowedTools": [],
      "history": [{"display": "fix tests", "pastedContents": {}}]
    }
  },
  "mcpServers": {
    "old": {
      "command": "legacy"
    }
  },
  "tipsHistory": {"memory": 3}
}
"#;

const GEMINI: &str = r#"{
    "selectedAuthType": "oauth-personal",
    "ui": {
        "theme": "GitHub"
    },
    "mcpServers": {}
}
"#;

const CODEX: &str = r#"# model settings
model = "o3"

[profiles.fast]
model = "o4-mini"

[mcp_servers.old]
command = "legacy"
"#;

struct Fixture {
    home: TestHome,
}

impl Fixture {
    fn new() -> Self {
        let home = TestHome::new();
        home.write("src/claude_desktop_config.json", SOURCE);
        home.write("user/.claude.json", CLAUDE_CODE);
        home.write("user/.gemini/settings.json", GEMINI);
        home.write("user/.codex/config.toml", CODEX);
        Self { home }
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(Catalog::new(self.home.path("user"), Platform::Linux))
    }

    fn request(&self) -> SyncRequest {
        SyncRequest {
            source: Some(self.home.path("src/claude_desktop_config.json")),
            targets: Vec::new(),
            mounts: Vec::new(),
            dry_run: false,
            jobs: 4,
            mount_timeout: Duration::from_secs(5),
        }
    }

    fn source_set(&self) -> ServerSet {
        load_source(&ConfigLocation::for_path(
            self.home.path("src/claude_desktop_config.json"),
        ))
        .unwrap()
    }

    fn servers_at(&self, rel: &str) -> ServerSet {
        let outcome = read(&ConfigLocation::for_path(self.home.path(rel))).unwrap();
        assert!(outcome.warnings.is_empty(), "{rel}: {:?}", outcome.warnings);
        outcome.servers
    }

    fn json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.home.read(rel)).unwrap()
    }
}

fn without_section(mut value: Value) -> Value {
    if let Some(root) = value.as_object_mut() {
        root.remove("mcpServers");
    }
    value
}

#[test]
fn full_sync_replaces_sections_and_preserves_everything_else() {
    let fx = Fixture::new();
    let before_claude = fx.json("user/.claude.json");
    let before_gemini = fx.json("user/.gemini/settings.json");

    let report = fx.orchestrator().run_sync(&fx.request()).unwrap();

    let updated: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.status == SyncStatus::Updated)
        .map(|r| r.location.application_id.as_str())
        .collect();
    assert_eq!(updated, ["claude-code", "codex-cli", "gemini-cli"]);
    assert_eq!(report.counts.failed, 0);

    let source = fx.source_set();
    assert_eq!(source.len(), 3);
    for rel in ["user/.claude.json", "user/.gemini/settings.json", "user/.codex/config.toml"] {
        assert_eq!(fx.servers_at(rel), source, "{rel}");
    }

    assert_eq!(without_section(fx.json("user/.claude.json")), without_section(before_claude));
    assert_eq!(without_section(fx.json("user/.gemini/settings.json")), without_section(before_gemini));

    let claude = fx.home.read("user/.claude.json");
    let prefix = &CLAUDE_CODE[..CLAUDE_CODE.find("\"mcpServers\"").unwrap()];
    assert!(claude.starts_with(prefix));
    assert!(claude.ends_with(",\n  \"tipsHistory\": {\"memory\": 3}\n}\n"));
    assert!(fx.home.read("user/.gemini/settings.json").contains("\n        \"filesystem\": {\n"));

    let codex = fx.home.read("user/.codex/config.toml");
    assert!(codex.starts_with("# model settings\nmodel = \"o3\"\n"));
    assert!(codex.contains("[profiles.fast]\nmodel = \"o4-mini\"\n"));
    assert!(!codex.contains("legacy"));
    assert!(codex.contains("always_allow = [\"read\", \"list\"]"));
}

#[test]
fn second_sync_is_a_no_op() {
    let fx = Fixture::new();
    let orchestrator = fx.orchestrator();
    orchestrator.run_sync(&fx.request()).unwrap();
    let snapshot: Vec<_> = ["user/.claude.json", "user/.gemini/settings.json", "user/.codex/config.toml"]
        .iter()
        .map(|rel| (fx.home.read(rel), fx.home.mtime(rel)))
        .collect();

    let report = orchestrator.run_sync(&fx.request()).unwrap();
    assert_eq!(report.counts.updated, 0);
    assert_eq!(report.counts.unchanged, 3);

    let after: Vec<_> = ["user/.claude.json", "user/.gemini/settings.json", "user/.codex/config.toml"]
        .iter()
        .map(|rel| (fx.home.read(rel), fx.home.mtime(rel)))
        .collect();
    assert_eq!(after, snapshot);
}

#[test]
fn dry_run_changes_no_file() {
    let fx = Fixture::new();
    let rels = ["user/.claude.json", "user/.gemini/settings.json", "user/.codex/config.toml"];
    let before: Vec<_> = rels.iter().map(|rel| (fx.home.read(rel), fx.home.mtime(rel))).collect();

    let mut request = fx.request();
    request.dry_run = true;
    let report = fx.orchestrator().run_sync(&request).unwrap();

    assert_eq!(report.counts.updated, 3);
    assert!(report.results.iter().all(|r| r.status != SyncStatus::Updated || !r.preview.is_empty()));
    let after: Vec<_> = rels.iter().map(|rel| (fx.home.read(rel), fx.home.mtime(rel))).collect();
    assert_eq!(after, before);
}

#[test]
fn legacy_spellings_count_as_unchanged() {
    let home = TestHome::new();
    home.write(
        "source.json",
        r#"{"mcpServers": {"web": {"type": "streamable-http", "url": "https://h/mcp", "disabled": true}}}"#,
    );
    let target = r#"{"mcpServers": {"web": {"url": "https://h/mcp", "enabled": false, "type": "streamableHttp"}}}"#;
    home.write("target.json", target);

    let report = Orchestrator::new(Catalog::new(home.path("user"), Platform::Linux))
        .run_sync(&SyncRequest {
            source: Some(home.path("source.json")),
            targets: vec![home.path("target.json")],
            mounts: Vec::new(),
            dry_run: false,
            jobs: 1,
            mount_timeout: Duration::from_secs(5),
        })
        .unwrap();

    assert_eq!(report.statuses(), [SyncStatus::Unchanged]);
    assert_eq!(home.read("target.json"), target);
}

#[test]
fn invalid_entry_is_reported_once_and_skipped_as_target() {
    let home = TestHome::new();
    let mixed = r#"{"mcpServers": {"keep": {"command": "a"}, "stale": {"env": {"A": "1"}}}}"#;
    home.write("mixed.json", mixed);
    home.write("source.json", r#"{"mcpServers": {"keep": {"command": "a"}}}"#);

    let outcome = read(&ConfigLocation::for_path(home.path("mixed.json"))).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].name, "stale");

    let orchestrator = Orchestrator::new(Catalog::new(home.path("user"), Platform::Linux));
    let as_target = SyncRequest {
        source: Some(home.path("source.json")),
        targets: vec![home.path("mixed.json")],
        mounts: Vec::new(),
        dry_run: false,
        jobs: 1,
        mount_timeout: Duration::from_secs(5),
    };
    let report = orchestrator.run_sync(&as_target).unwrap();
    assert_eq!(report.statuses(), [SyncStatus::Updated]);
    assert_eq!(report.results[0].warnings.len(), 1);

    home.write("mixed.json", mixed);
    let as_source = SyncRequest {
        source: Some(home.path("mixed.json")),
        targets: vec![home.path("source.json")],
        ..as_target
    };
    assert!(orchestrator.run_sync(&as_source).is_err());
    assert_eq!(
        home.read("source.json"),
        r#"{"mcpServers": {"keep": {"command": "a"}}}"#
    );
}

#[test]
fn mounted_home_is_synced_alongside_local_one() {
    let fx = Fixture::new();
    fx.home.write("backup/.cursor/mcp.json", "{\"mcpServers\": {}}\n");

    let mut request = fx.request();
    request.mounts = vec![fx.home.path("backup"), PathBuf::from("/definitely/not/mounted")];
    let report = fx.orchestrator().run_sync(&request).unwrap();

    assert_eq!(report.counts.updated, 4);
    assert_eq!(report.counts.failed, 0);
    assert_eq!(fx.servers_at("backup/.cursor/mcp.json"), fx.source_set());
    assert!(
        report
            .results
            .iter()
            .filter(|r| r.location.path.as_str().starts_with("/definitely/not/mounted"))
            .all(|r| r.status == SyncStatus::Skipped)
    );
}
