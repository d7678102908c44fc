use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn temp_namespace_path(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("iced_prefs_{}_{}_{}", tag, std::process::id(), unique))
        .join("prefs.json")
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_set_then_get() {
    let storage = MemoryStorage::new();
    assert!(storage.set("theme", "\"dark\""));
    assert_eq!(storage.get("theme"), Some("\"dark\"".to_string()));
}

#[test]
fn memory_get_missing_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("missing"), None);
}

#[test]
fn memory_remove_deletes_entry() {
    let storage = MemoryStorage::new();
    storage.set("theme", "\"dark\"");
    storage.remove("theme");
    assert_eq!(storage.get("theme"), None);
}

#[test]
fn memory_keys_are_sorted() {
    let storage = MemoryStorage::new();
    storage.set("b", "2");
    storage.set("a", "1");
    storage.set("c", "3");
    assert_eq!(storage.keys(), vec!["a", "b", "c"]);
}

#[test]
fn memory_clear_empties_namespace() {
    let storage = MemoryStorage::new();
    storage.set("a", "1");
    storage.set("b", "2");
    storage.clear();
    assert!(storage.keys().is_empty());
    assert_eq!(storage.get("a"), None);
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_set_then_get() {
    let path = temp_namespace_path("set_get");
    let storage = FileStorage::at_path(&path);
    assert!(storage.set("count", "42"));
    assert_eq!(storage.get("count"), Some("42".to_string()));
}

#[test]
fn file_values_survive_reopen() {
    let path = temp_namespace_path("reopen");
    {
        let storage = FileStorage::at_path(&path);
        storage.set("count", "42");
        storage.set("theme", "\"dark\"");
    }

    let reopened = FileStorage::at_path(&path);
    assert_eq!(reopened.get("count"), Some("42".to_string()));
    assert_eq!(reopened.get("theme"), Some("\"dark\"".to_string()));
    assert_eq!(reopened.keys(), vec!["count", "theme"]);
}

#[test]
fn file_remove_survives_reopen() {
    let path = temp_namespace_path("remove");
    {
        let storage = FileStorage::at_path(&path);
        storage.set("count", "42");
        storage.remove("count");
    }

    let reopened = FileStorage::at_path(&path);
    assert_eq!(reopened.get("count"), None);
}

#[test]
fn file_missing_file_is_empty_namespace() {
    let storage = FileStorage::at_path(temp_namespace_path("missing"));
    assert!(storage.keys().is_empty());
}

#[test]
fn file_corrupt_file_degrades_to_empty_namespace() {
    let path = temp_namespace_path("corrupt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "this is not json").unwrap();

    let storage = FileStorage::at_path(&path);
    assert!(storage.keys().is_empty());

    // The namespace is still writable afterwards.
    assert!(storage.set("theme", "\"dark\""));
    assert_eq!(storage.get("theme"), Some("\"dark\"".to_string()));
}

#[test]
fn file_format_is_a_json_object() {
    let path = temp_namespace_path("format");
    let storage = FileStorage::at_path(&path);
    storage.set("a", "1");
    storage.set("b", "\"two\"");

    let contents = fs::read_to_string(&path).unwrap();
    let parsed: BTreeMap<String, String> = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
    assert_eq!(parsed.get("b").map(String::as_str), Some("\"two\""));
}
