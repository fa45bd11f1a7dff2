//! Storage invariant tests
//!
//! Tests for:
//! - Round trip: Write then Read yields the written value
//! - Validation: empty names fail with no filesystem change
//! - Delete semantics: resource, missing path, whole collection
//! - Document encoding on disk

use std::fs;
use std::path::Path;
use std::sync::Arc;

use jsondb::observability::MemoryLogger;
use jsondb::{Driver, Options, StorageErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    zipcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Person {
    name: String,
    age: u32,
    address: Address,
}

fn person(name: &str, age: u32) -> Person {
    Person {
        name: name.to_string(),
        age,
        address: Address {
            city: format!("{} city", name),
            zipcode: "1001".to_string(),
        },
    }
}

fn open(dir: &Path) -> Driver {
    Driver::new(dir, Options::with_logger(Arc::new(MemoryLogger::new())))
        .expect("Failed to open driver")
}

fn snapshot(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_round_trip_typed_records() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    for (i, name) in ["John", "Alex", "Max"].iter().enumerate() {
        let p = person(name, 20 + i as u32);
        db.write("users", name, &p).unwrap();
        let back: Person = db.read("users", name).unwrap();
        assert_eq!(back, p);
    }
}

#[test]
fn test_round_trip_arbitrary_json() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    let values = vec![
        json!(null),
        json!(42),
        json!("text with \"quotes\" and\ttabs"),
        json!([1, "two", {"three": 3.5}]),
        json!({"nested": {"deep": {"deeper": [true, false]}}, "unicode": "żółw"}),
    ];

    for (i, v) in values.iter().enumerate() {
        let name = format!("doc{}", i);
        db.write("misc", &name, v).unwrap();
        let back: Value = db.read("misc", &name).unwrap();
        assert_eq!(&back, v, "round trip failed for {}", name);
    }
}

#[test]
fn test_documents_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let db = open(temp_dir.path());
        db.write("users", "john", &person("John", 23)).unwrap();
    }

    let db = open(temp_dir.path());
    let back: Person = db.read("users", "john").unwrap();
    assert_eq!(back.name, "John");
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_document_is_tab_indented_with_one_trailing_newline() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    db.write("users", "john", &person("John", 23)).unwrap();

    let text = fs::read_to_string(temp_dir.path().join("users/john.json")).unwrap();
    assert!(text.starts_with("{\n\t\"Name\": \"John\",\n\t\"Age\": 23,"));
    assert!(text.ends_with("}\n"));
    assert!(!text.ends_with("\n\n"));
    assert!(text.contains("\n\t\t\"city\": \"John city\""));
}

#[test]
fn test_no_temp_file_after_successful_write() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    db.write("users", "john", &person("John", 23)).unwrap();

    assert_eq!(snapshot(&temp_dir.path().join("users")), vec!["john.json"]);
}

#[test]
fn test_stale_temp_file_overwritten_by_next_write() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());
    let users = temp_dir.path().join("users");
    fs::create_dir(&users).unwrap();
    fs::write(users.join("john.json.tmp"), b"{ half a docu").unwrap();

    db.write("users", "john", &person("John", 23)).unwrap();

    assert_eq!(snapshot(&users), vec!["john.json"]);
    let back: Person = db.read("users", "john").unwrap();
    assert_eq!(back.age, 23);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_empty_identifiers_rejected_without_side_effects() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());
    let before = snapshot(temp_dir.path());

    let err = db.write("", "john", &person("John", 23)).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::Validation);
    assert!(err.message().contains("collection"));

    let err = db.write("users", "", &person("John", 23)).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::Validation);
    assert!(err.message().contains("resource"));

    assert_eq!(snapshot(temp_dir.path()), before);
    assert_eq!(db.tracked_collections(), 0);
}

#[test]
fn test_path_escapes_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("db");
    let db = open(&root);

    assert!(db.write("..", "x", &1).unwrap_err().is_validation());
    assert!(db.write("users", "../x", &1).unwrap_err().is_validation());
    assert!(db.delete("users", "../../etc").unwrap_err().is_validation());

    assert_eq!(snapshot(temp_dir.path()), vec!["db"]);
}

// =============================================================================
// Read errors
// =============================================================================

#[test]
fn test_not_found_and_decode_are_distinct() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    let missing = db.read::<Person>("users", "nobody").unwrap_err();
    assert_eq!(missing.code(), StorageErrorCode::NotFound);

    fs::create_dir(temp_dir.path().join("users")).unwrap();
    fs::write(temp_dir.path().join("users/broken.json"), b"{\"Name\": ").unwrap();
    let broken = db.read::<Person>("users", "broken").unwrap_err();
    assert_eq!(broken.code(), StorageErrorCode::Decode);
}

// =============================================================================
// Delete semantics
// =============================================================================

#[test]
fn test_delete_removes_only_target() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());
    for name in ["a", "b", "c"] {
        db.write("letters", name, &json!(name)).unwrap();
    }

    db.delete("letters", "b").unwrap();

    assert_eq!(
        snapshot(&temp_dir.path().join("letters")),
        vec!["a.json", "c.json"]
    );
}

#[test]
fn test_delete_missing_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    let err = db.delete("letters", "zz").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("zz"));
}

#[test]
fn test_delete_directory_removes_subtree() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());
    db.write("letters", "a", &1).unwrap();
    fs::create_dir_all(temp_dir.path().join("letters/nested/deeper")).unwrap();
    fs::write(temp_dir.path().join("letters/nested/deeper/x"), b"x").unwrap();

    db.delete("letters", "nested").unwrap();
    assert_eq!(snapshot(&temp_dir.path().join("letters")), vec!["a.json"]);

    db.delete("letters", "").unwrap();
    assert!(!temp_dir.path().join("letters").exists());
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[test]
fn test_users_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(temp_dir.path());

    for (name, age) in [("John", 23), ("Alex", 33), ("Max", 33)] {
        db.write("users", name, &person(name, age)).unwrap();
    }

    let all = db.read_all("users").unwrap();
    assert_eq!(all.len(), 3);
    for raw in &all {
        let p: Person = serde_json::from_str(raw).unwrap();
        assert!(["John", "Alex", "Max"].contains(&p.name.as_str()));
    }

    db.delete("users", "John").unwrap();

    let err = db.read::<Person>("users", "John").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(db.read_all("users").unwrap().len(), 2);

    let typed: Vec<Person> = db.read_all_as("users").unwrap();
    let names: Vec<_> = typed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alex", "Max"]);
}
