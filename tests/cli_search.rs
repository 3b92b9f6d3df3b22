// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIDGET: &str = "package p;\nclass Widget {\n  void foo(int x) {}\n  void use() { Widget w = new Widget(); w.foo(1); }\n}\n";

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

fn codematch() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("codematch"))
}

fn indexed_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write_file(dir.path(), "p/Widget.java", WIDGET);
    write_file(dir.path(), "p/Gadget.java", "package p;\nclass Gadget extends Widget {}\n");
    codematch()
        .current_dir(dir.path())
        .args(["index", "--quiet"])
        .assert()
        .success();
    dir
}

fn search_json(dir: &TempDir, args: &[&str]) -> Vec<Value> {
    let assert = codematch()
        .current_dir(dir.path())
        .args(["--format", "json", "--compact", "search"])
        .args(args)
        .assert()
        .success();
    let raw = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let payload: Value = serde_json::from_str(&raw).expect("json");
    payload.as_array().cloned().expect("array of matches")
}

#[test]
fn index_reports_what_it_did_as_json() {
    let dir = TempDir::new().expect("tempdir");
    write_file(dir.path(), "p/Widget.java", WIDGET);
    write_file(dir.path(), "README.md", "# not java\n");

    let assert = codematch()
        .current_dir(dir.path())
        .args(["index", "--format", "json"])
        .assert()
        .success();
    let raw = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let payload: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(payload["scanned"], 1);
    assert_eq!(payload["indexed"], 1);
    assert!(payload["keys"].as_u64().unwrap_or(0) > 0);

    let assert = codematch()
        .current_dir(dir.path())
        .args(["index", "--format", "json"])
        .assert()
        .success();
    let raw = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let payload: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(payload["indexed"], 0);
    assert_eq!(payload["unchanged"], 1);
}

#[test]
fn method_references_come_back_as_json() {
    let dir = indexed_project();
    let matches = search_json(&dir, &["method", "foo", "--declaring", "Widget", "--refs"]);

    assert_eq!(matches.len(), 1);
    let found = &matches[0];
    assert_eq!(found["path"], "p/Widget.java");
    assert_eq!(found["line"], 4);
    assert_eq!(found["accuracy"], "accurate");
    assert_eq!(found["declaration"], false);
    assert!(found["text"].as_str().unwrap_or_default().starts_with("foo"));
}

#[test]
fn declarations_and_prefix_mode() {
    let dir = indexed_project();
    let matches = search_json(&dir, &["type", "Wid", "--mode", "prefix", "--decls"]);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["declaration"], true);
    assert_eq!(matches[0]["text"], "Widget");
}

#[test]
fn super_type_references_find_subclasses() {
    let dir = indexed_project();
    let matches = search_json(&dir, &["super-type", "Widget"]);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["path"], "p/Gadget.java");
}

#[test]
fn excluded_paths_yield_an_empty_list() {
    let dir = indexed_project();
    let matches = search_json(&dir, &["method", "foo", "--refs", "-x", "Widget.java"]);
    assert!(matches.is_empty());
}

#[test]
fn zero_matches_still_succeed() {
    let dir = indexed_project();
    codematch()
        .current_dir(dir.path())
        .args(["search", "type", "Nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found"));
}

#[test]
fn search_without_an_index_suggests_indexing() {
    let dir = TempDir::new().expect("tempdir");
    write_file(dir.path(), "A.java", "class A {}\n");
    codematch()
        .current_dir(dir.path())
        .args(["search", "type", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("codematch index"));
}

#[test]
fn local_search_needs_a_declaration_site() {
    let dir = indexed_project();
    codematch()
        .current_dir(dir.path())
        .args(["search", "local", "w"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--offset"));
}

#[test]
fn completions_are_generated() {
    codematch()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("codematch"));
}
