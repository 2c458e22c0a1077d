//! End-to-end tests for the fieldkit binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PAGE_SCHEMA: &str = "\
fields:
  - info: Fill in the hero first.
  - name: title
    type: string
  - name: body
    type: rich-text
  - name: price
    type: number
    default: 5
";

const GROUP_SCHEMA: &str = "\
fields:
  - name: price
    type: number
";

/// A scratch project with its own home directory, so no user config leaks in.
struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        let site = Self {
            dir: TempDir::new().unwrap(),
        };
        site.write("page.yaml", PAGE_SCHEMA);
        site.write("group.yaml", GROUP_SCHEMA);
        site
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.path().join(name), contents).unwrap();
    }

    fn fieldkit(&self) -> Command {
        let mut cmd = Command::cargo_bin("fieldkit").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("FIELDKIT_STORE__ROOT")
            .env_remove("FIELDKIT_STORE__KEY_PREFIX")
            .arg("--store")
            .arg(self.path().join("data"))
            .arg("--quiet");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .fieldkit()
            .args(args)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("fieldkit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("save-document"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_normalize_expands_info_shorthand() {
    let site = Site::new();
    let tree = site.json(&["normalize", "page.yaml"]);
    assert_eq!(
        tree["fields"][0],
        json!({"type": "info", "name": "info_0", "text": "Fill in the hero first."})
    );
    assert_eq!(tree["fields"][1]["name"], "title");
}

#[test]
fn test_validate_accepts_and_rejects() {
    let site = Site::new();
    site.fieldkit()
        .args(["validate", "page.yaml", "--context", "page.php"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: true"));

    site.fieldkit()
        .args(["validate", "page.yaml", "--context", "template-parts/header.php"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Info fields are not allowed"));
}

#[test]
fn test_validate_reports_missing_fields() {
    let site = Site::new();
    site.write("empty.yaml", "title: nothing here\n");
    site.fieldkit()
        .args(["validate", "empty.yaml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Schema must contain a fields array"));
}

#[test]
fn test_sanitize_without_store() {
    let site = Site::new();
    site.write(
        "values.json",
        r#"{"title": "<b>Hi</b>", "body": "<p>ok</p><script>x</script>", "price": 9}"#,
    );
    let cleaned = site.json(&["sanitize", "--schema", "page.yaml", "--data", "values.json"]);
    assert_eq!(
        cleaned,
        json!({"title": "Hi", "body": "<p>ok</p>", "price": 9})
    );
    assert!(!site.path().join("data").exists());
}

#[test]
fn test_missing_file_is_an_error() {
    let site = Site::new();
    site.fieldkit()
        .args(["normalize", "nope.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reading nope.yaml"));
}

#[test]
fn test_save_and_resolve_through_layers() {
    let site = Site::new();

    site.fieldkit()
        .args(["save-schema", "page.yaml", "--scope", "template:page.php"])
        .assert()
        .success();
    site.fieldkit()
        .args(["save-schema", "group.yaml", "--scope", "group:page.php"])
        .assert()
        .success();
    site.fieldkit().args(["bind", "7", "page.php"]).assert().success();

    site.write("doc.yaml", "title: Local\nprice: 10\n");
    site.write("shared.yaml", "price: 20\n");
    site.fieldkit()
        .args(["save-values", "shared.yaml", "--group", "page.php"])
        .assert()
        .success();
    site.fieldkit()
        .args(["save-document", "7", "doc.yaml", "--shared", "price"])
        .assert()
        .success();

    assert_eq!(site.json(&["resolve", "title", "--document", "7"]), json!("Local"));
    assert_eq!(site.json(&["resolve", "price", "--document", "7"]), json!(20));
    assert_eq!(site.json(&["resolve", "price", "--group", "page.php"]), json!(20));
    assert_eq!(site.json(&["resolve", "body", "--document", "7"]), Value::Null);

    let all = site.json(&["resolve-all", "7"]);
    assert_eq!(all["title"], "Local");
    assert_eq!(all["price"], 20);
    assert_eq!(all["body"], Value::Null);
}

#[test]
fn test_rejected_schema_is_not_saved() {
    let site = Site::new();
    site.fieldkit()
        .args(["save-schema", "page.yaml", "--scope", "template:header.php"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("valid: false"));

    site.fieldkit()
        .args(["show-schema", "--scope", "template:header.php", "--source"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_show_schema_source_round_trips() {
    let site = Site::new();
    site.fieldkit()
        .args(["save-schema", "page.yaml", "--scope", "template:page.php"])
        .assert()
        .success();
    site.fieldkit()
        .args(["show-schema", "--scope", "template:page.php", "--source"])
        .assert()
        .success()
        .stdout(PAGE_SCHEMA);
}

#[test]
fn test_unbound_document_exits_with_warning() {
    let site = Site::new();
    site.write("doc.yaml", "title: Local\n");
    site.fieldkit()
        .args(["save-document", "99", "doc.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not bound"));
}

#[test]
fn test_global_values_need_enabling() {
    let site = Site::new();
    site.write("global.yaml", "fields:\n  - name: phone\n    type: string\n");
    site.write("phone.yaml", "phone: 555-0100\n");
    site.fieldkit()
        .args(["save-schema", "global.yaml", "--scope", "global"])
        .assert()
        .success();
    site.fieldkit()
        .args(["save-values", "phone.yaml", "--global"])
        .assert()
        .success();

    assert_eq!(site.json(&["resolve", "phone", "--group", "page.php"]), Value::Null);

    site.fieldkit()
        .args(["enable-global", "page.php"])
        .assert()
        .success();
    assert_eq!(
        site.json(&["resolve", "phone", "--group", "page.php"]),
        json!("555-0100")
    );
}

#[test]
fn test_resolve_default_from_schema() {
    let site = Site::new();
    site.fieldkit()
        .args(["save-schema", "page.yaml", "--scope", "template:page.php"])
        .assert()
        .success();
    site.fieldkit().args(["bind", "3", "page.php"]).assert().success();

    assert_eq!(site.json(&["resolve", "price", "--document", "3"]), Value::Null);
    assert_eq!(
        site.json(&["resolve", "price", "--document", "3", "--default"]),
        json!(5)
    );
}
