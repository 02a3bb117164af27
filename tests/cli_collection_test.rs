//! Integration tests for collection commands via CLI.
//!
//! These tests verify that:
//! - `iv collection create/rename/delete/list` work
//! - deleting a collection unassigns its ideas instead of deleting them
//! - names are validated

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_collection_create_json() {
    let env = TestEnv::new();

    env.iv()
        .args(["collection", "create", "Side projects"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\""))
        .stdout(predicate::str::contains("\"name\":\"Side projects\""));

    let doc = env.document();
    assert_eq!(doc["collections"][0]["name"], "Side projects");
}

#[test]
fn test_collection_create_human() {
    let env = TestEnv::new();

    env.iv()
        .args(["collection", "create", "Work", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created collection "))
        .stdout(predicate::str::contains("\"Work\""));
}

#[test]
fn test_collection_create_blank_name_fails() {
    let env = TestEnv::new();

    env.iv()
        .args(["collection", "create", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"validation\""));
}

#[test]
fn test_collection_rename() {
    let env = TestEnv::new();
    let id = env.create_collection("Old");

    let renamed = env.json(&["collection", "rename", &id, "New"]);
    assert_eq!(renamed["id"], id.as_str());
    assert_eq!(renamed["name"], "New");

    env.iv()
        .args(["collection", "rename", "missing", "Name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_found"));
}

#[test]
fn test_collection_delete_unassigns_ideas() {
    let env = TestEnv::new();
    let collection = env.create_collection("Doomed");
    let idea = env.create_idea("Survivor", &["-c", &collection]);

    let deleted = env.json(&["collection", "delete", &collection]);
    assert_eq!(deleted["unassigned"], serde_json::json!([idea]));

    let shown = env.json(&["idea", "show", &idea]);
    assert!(shown["collectionId"].is_null());
    assert_eq!(env.document()["collections"], serde_json::json!([]));
}

#[test]
fn test_idea_in_unknown_collection_fails() {
    let env = TestEnv::new();

    env.iv()
        .args(["idea", "create", "Lost", "-c", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not_found"));
}

#[test]
fn test_collection_list_counts() {
    let env = TestEnv::new();
    let a = env.create_collection("A");
    env.create_collection("B");
    env.create_idea("one", &["-c", &a]);
    env.create_idea("two", &["-c", &a]);
    env.create_idea("loose", &[]);

    let list = env.json(&["collection", "list"]);
    assert_eq!(list["count"], 2);
    assert_eq!(list["collections"][0]["name"], "A");
    assert_eq!(list["collections"][0]["idea_count"], 2);
    assert_eq!(list["collections"][1]["idea_count"], 0);
    assert_eq!(list["unassigned"], 1);

    env.iv()
        .args(["collection", "list", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unassigned: 1"));
}
