//! End-to-end audits over temporary snapshot, spec and navigation files.

use sdk_doc_audit::{
    AuditConfig, AuditError, AuditOrchestrator, DocSpec, IssueKind, Severity, ValidationReport,
};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

const UMBRELLA_SNAPSHOT: &str = r#"{
    "name": "supabase",
    "children": [{
        "name": "@supabase/auth-js",
        "kind": 2,
        "children": [{
            "name": "index",
            "kind": 2,
            "children": [{
                "name": "GoTrueClient",
                "kind": 128,
                "sources": [{ "fileName": "src/GoTrueClient.ts", "line": 120 }],
                "children": [
                    { "name": "signUp", "kind": 2048,
                      "sources": [{ "fileName": "src/GoTrueClient.ts", "line": 300 }],
                      "signatures": [{ "comment": {
                          "summary": [{ "kind": "text", "text": "Creates a new user." }],
                          "blockTags": [{ "tag": "@example", "content": [{ "kind": "code", "text": "```js\nawait supabase.auth.signUp({ email, password })\n```" }] }]
                      } }] },
                    { "name": "signOut", "kind": 2048,
                      "signatures": [{ "comment": {
                          "summary": [{ "kind": "text", "text": "Signs out the current user." }]
                      } }] },
                    { "name": "_refresh", "kind": 2048 }
                ]
            }]
        }]
    }, {
        "name": "@supabase/supabase-js",
        "kind": 2,
        "children": [{
            "name": "SupabaseClient",
            "kind": 128,
            "children": [
                { "name": "constructor", "kind": 512 },
                { "name": "from", "kind": 2048 },
                { "name": "channel", "kind": 2048 }
            ]
        }, {
            "name": "GoTrueClient",
            "kind": 128,
            "children": [{ "name": "signUp", "kind": 2048 }]
        }]
    }, {
        "name": "@supabase/postgrest-js",
        "kind": 2,
        "children": [{
            "name": "PostgrestFilterBuilder",
            "kind": 128,
            "children": [{ "name": "eq", "kind": 2048 }, { "name": "neq", "kind": 2048 }]
        }]
    }]
}"#;

const UMBRELLA_SPEC: &str = "\
# Hand-maintained reference
info:
  id: reference/supabase-js
  title: Supabase Client

functions:
  - id: initializing
    title: 'Initializing'
    $ref: '@supabase/supabase-js.SupabaseClient.constructor'

  - id: sign-up
    title: 'signUp()'
    $ref: '@supabase/auth-js.GoTrueClient.signUp'
    notes: |
      Keep this note.
    description: |
      Manual text that the doc-comment replaces.

  - id: using-filters
    title: Using filters

  - id: eq
    title: eq()
    $ref: '@supabase/postgrest-js.PostgrestFilterBuilder.eq'
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(snapshot: &str, spec: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("api.json"), snapshot).unwrap();
        std::fs::write(dir.path().join("spec.yml"), spec).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> AuditConfig {
        AuditConfig::new(self.path("api.json"), self.path("spec.yml"))
            .with_sections_path(self.path("sections.json"))
            .with_report_path(self.path("report.json"))
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).unwrap()
    }

    fn sections(&self) -> Vec<Value> {
        serde_json::from_str(&self.read("sections.json")).unwrap()
    }
}

fn reparse(text: &str) -> DocSpec {
    DocSpec::from_yaml(text, Path::new("spec.yml")).unwrap()
}

#[tokio::test]
async fn test_top_level_class_scenario() {
    let snapshot = r#"{
        "children": [{
            "name": "Pkg",
            "kind": 2,
            "children": [{
                "name": "Foo",
                "kind": 128,
                "children": [{ "name": "bar", "kind": 2048 }, { "name": "_baz", "kind": 2048 }]
            }]
        }]
    }"#;
    let ws = Workspace::new(snapshot, "functions: []\n");
    let outcome = AuditOrchestrator::new(ws.config()).run().await.unwrap();

    let report = &outcome.report;
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.missing_documentation, 1);
    let issue = &report.issues[0];
    assert_eq!(issue.path.as_deref(), Some("Pkg.Foo.bar"));
    assert_eq!(issue.severity, Severity::Error);
    assert!(!report.issues.iter().any(|i| i.path.as_deref() == Some("Pkg.Foo._baz")));
}

#[tokio::test]
async fn test_broken_reference_scenario() {
    let snapshot = r#"{ "children": [{ "name": "Pkg", "kind": 2, "children": [] }] }"#;
    let spec = "functions:\n  - id: foo-bar\n    $ref: Pkg.Foo.bar\n";
    let ws = Workspace::new(snapshot, spec);
    let outcome = AuditOrchestrator::new(ws.config()).run().await.unwrap();

    assert_eq!(outcome.report.summary.broken_references, 1);
    assert_eq!(outcome.report.summary.total, 1);
    let issue = &outcome.report.issues[0];
    assert_eq!(issue.kind, IssueKind::BrokenReference);
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.reference.as_deref(), Some("foo-bar"));

    let persisted: ValidationReport = serde_json::from_str(&ws.read("report.json")).unwrap();
    assert_eq!(persisted.summary.broken_references, 1);
}

#[tokio::test]
async fn test_reexports_and_umbrella_class() {
    let ws = Workspace::new(UMBRELLA_SNAPSHOT, UMBRELLA_SPEC);
    let outcome = AuditOrchestrator::new(ws.config()).run().await.unwrap();
    let missing: Vec<&str> = outcome
        .report
        .issues_of(IssueKind::MissingDocumentation)
        .filter_map(|issue| issue.path.as_deref())
        .collect();

    assert!(!missing.contains(&"@supabase/supabase-js.GoTrueClient.signUp"));
    assert!(missing.contains(&"@supabase/supabase-js.SupabaseClient.from"));
    assert!(missing.contains(&"@supabase/auth-js.GoTrueClient.signOut"));
    assert!(!missing.iter().any(|path| path.ends_with("_refresh")));
    assert!(!missing.contains(&"@supabase/supabase-js.SupabaseClient.constructor"));
}

#[tokio::test]
async fn test_fix_updates_spec_and_preserves_formatting() {
    let ws = Workspace::new(UMBRELLA_SNAPSHOT, UMBRELLA_SPEC);
    let outcome = AuditOrchestrator::new(ws.config().with_fix(true)).run().await.unwrap();
    assert!(outcome.spec_written);
    // sign-up's manual text and the signOut stub's copied doc-comment.
    assert_eq!(outcome.sync.descriptions_removed, 2);
    assert_eq!(outcome.stubs_added.len(), 4);

    let text = ws.read("spec.yml");
    assert!(text.starts_with("# Hand-maintained reference\ninfo:\n"));
    assert!(text.contains("    notes: |\n      Keep this note.\n"));
    assert!(!text.contains("Manual text"));
    assert!(text.contains("sign-up-typedoc-example-1"));

    let spec = reparse(&text);
    let ids: Vec<&str> = spec.functions.iter().map(|entry| entry.id.as_str()).collect();
    assert!(ids.contains(&"auth-js-gotrueclient-signout"));
    assert!(ids.contains(&"supabase-js-supabaseclient-from"));
    let sign_out = &spec.functions[spec.position("auth-js-gotrueclient-signout").unwrap()];
    assert_eq!(sign_out.title.as_deref(), Some("GoTrueClient.signOut()"));
    // The doc-comment supersedes the stub's own description.
    assert!(sign_out.description.is_none());
}

#[tokio::test]
async fn test_fix_twice_is_a_no_op() {
    let ws = Workspace::new(UMBRELLA_SNAPSHOT, UMBRELLA_SPEC);
    let config = ws.config().with_fix(true);

    AuditOrchestrator::new(config.clone()).run().await.unwrap();
    let spec_once = ws.read("spec.yml");
    let sections_once = ws.read("sections.json");

    let second = AuditOrchestrator::new(config).run().await.unwrap();
    assert!(second.stubs_added.is_empty());
    assert!(second.sync.is_empty());
    assert!(!second.spec_written);
    assert_eq!(ws.read("spec.yml"), spec_once);
    assert_eq!(ws.read("sections.json"), sections_once);
}

#[tokio::test]
async fn test_sections_group_and_categories() {
    let ws = Workspace::new(UMBRELLA_SNAPSHOT, UMBRELLA_SPEC);
    AuditOrchestrator::new(ws.config()).run().await.unwrap();
    let sections = ws.sections();

    let database = sections.iter().find(|node| node["title"] == "Database").unwrap();
    let filters = &database["items"][0];
    assert_eq!(filters["id"], "using-filters");
    assert_eq!(filters["items"][0]["id"], "eq");

    let auth = sections.iter().find(|node| node["title"] == "Auth").unwrap();
    assert_eq!(auth["items"][0]["id"], "sign-up");
    assert!(!sections.iter().any(|node| node["title"] == "Storage"));
}

#[tokio::test]
async fn test_sections_merge_keeps_manual_fields() {
    let ws = Workspace::new(UMBRELLA_SNAPSHOT, UMBRELLA_SPEC);
    let existing = json!([
        { "type": "markdown", "id": "introduction", "title": "Introduction", "slug": "introduction" },
        { "type": "category", "title": "Auth", "items": [
            { "type": "function", "id": "sign-up", "title": "signUp()", "slug": "sign-up", "isSpotlight": true }
        ]},
        { "type": "category", "title": "Misc", "items": [
            { "type": "markdown", "id": "release-notes", "title": "Release Notes", "slug": "release-notes" }
        ]}
    ]);
    std::fs::write(ws.path("sections.json"), serde_json::to_string_pretty(&existing).unwrap()).unwrap();

    AuditOrchestrator::new(ws.config()).run().await.unwrap();
    let sections = ws.sections();

    let titles: Vec<&str> = sections.iter().filter_map(|node| node["title"].as_str()).collect();
    assert_eq!(titles, vec!["Introduction", "Database", "Auth", "Misc"]);
    assert_eq!(sections[2]["items"][0]["isSpotlight"], true);
}

#[tokio::test]
async fn test_missing_snapshot_is_fatal() {
    let ws = Workspace::new("{}", "functions: []\n");
    std::fs::remove_file(ws.path("api.json")).unwrap();
    let err = AuditOrchestrator::new(ws.config()).run().await.unwrap_err();
    assert!(matches!(err, AuditError::Config(_)));
    assert!(!ws.path("report.json").exists());
}

#[tokio::test]
async fn test_invalid_snapshot_is_fatal() {
    let ws = Workspace::new("{ not json", "functions: []\n");
    let err = AuditOrchestrator::new(ws.config()).run().await.unwrap_err();
    assert!(matches!(err, AuditError::Json { .. }));
    assert!(!ws.path("report.json").exists());
    assert!(!ws.path("sections.json").exists());
}
