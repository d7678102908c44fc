use super::*;
use crate::storage::MemoryStorage;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Filters {
    tags: Vec<String>,
    enabled: bool,
}

fn memory_prefs() -> Prefs {
    Prefs::with_storage(Arc::new(MemoryStorage::new()))
}

/// Storage that is present but never works, like a blocked browser store.
struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> bool {
        false
    }

    fn remove(&self, _key: &str) {}

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn clear(&self) {}
}

// =============================================================================
// read / get / set round-tripping
// =============================================================================

#[test]
fn set_then_get_round_trips() {
    let prefs = memory_prefs();
    let store = prefs.store(
        "filters",
        Filters {
            tags: Vec::new(),
            enabled: false,
        },
    );

    let written = Filters {
        tags: vec!["speedrun".to_string(), "drops".to_string()],
        enabled: true,
    };
    store.set(written.clone());

    assert_eq!(store.get(), written);
    assert_eq!(store.read(), written);
}

#[test]
fn set_persists_to_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let prefs = Prefs::with_storage(Arc::clone(&storage) as Arc<dyn StorageBackend>);
    let store = prefs.store("count", 0u32);

    store.set(7);

    assert_eq!(storage.get("count"), Some("7".to_string()));
}

#[test]
fn update_applies_function_of_previous_value() {
    let prefs = memory_prefs();
    let store = prefs.store("tags", Vec::<String>::new());

    store.update(|mut tags| {
        tags.push("esports".to_string());
        tags
    });
    store.update(|mut tags| {
        tags.push("casual".to_string());
        tags
    });

    assert_eq!(store.get(), vec!["esports", "casual"]);
}

#[test]
fn get_does_not_re_read_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let prefs = Prefs::with_storage(Arc::clone(&storage) as Arc<dyn StorageBackend>);
    let store = prefs.store("count", 0u32);

    store.set(7);
    // A write made behind the binding's back (no bus event) is invisible
    // to `get`, but `read` sees it.
    storage.set("count", "99");

    assert_eq!(store.get(), 7);
    assert_eq!(store.read(), 99);
}

// =============================================================================
// defaults
// =============================================================================

#[test]
fn missing_entry_falls_back_to_literal_default() {
    let prefs = memory_prefs();
    let store = prefs.store("theme", "light".to_string());

    assert_eq!(store.read(), "light");
    assert_eq!(store.get(), "light");
}

#[test]
fn missing_entry_falls_back_to_produced_default() {
    let prefs = memory_prefs();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let store = prefs.store_with("count", move || {
        counted.fetch_add(1, Ordering::Relaxed);
        41u32
    });

    assert_eq!(store.read(), 41);
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    // get initializes lazily from one more read, then caches.
    assert_eq!(store.get(), 41);
    assert_eq!(store.get(), 41);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn corrupt_entry_falls_back_to_default() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("filters", "definitely not json");
    let prefs = Prefs::with_storage(storage as Arc<dyn StorageBackend>);

    let default = Filters {
        tags: Vec::new(),
        enabled: true,
    };
    let store = prefs.store("filters", default.clone());

    assert_eq!(store.read(), default);
    assert_eq!(store.get(), default);
}

#[test]
fn unavailable_storage_degrades_to_default() {
    let prefs = Prefs::with_storage(Arc::new(UnavailableStorage));
    let store = prefs.store("count", 3u32);

    assert_eq!(store.read(), 3);

    // The write cannot be persisted, but the in-memory value still moves.
    store.set(9);
    assert_eq!(store.get(), 9);
    assert_eq!(store.read(), 3);
}

// =============================================================================
// remove
// =============================================================================

#[test]
fn remove_deletes_entry_and_resets_to_default() {
    let storage = Arc::new(MemoryStorage::new());
    let prefs = Prefs::with_storage(Arc::clone(&storage) as Arc<dyn StorageBackend>);
    let store = prefs.store("count", 0u32);

    store.set(7);
    store.remove();

    assert_eq!(storage.get("count"), None);
    assert_eq!(store.get(), 0);
}

// =============================================================================
// cross-binding propagation
// =============================================================================

#[test]
fn foreign_write_updates_other_binding_in_place() {
    let prefs = memory_prefs();
    let writer = prefs.store("count", 0u32);
    let observer = prefs.store("count", 0u32);

    // Materialize the observer's in-memory value first, so the update below
    // cannot be explained by lazy initialization.
    assert_eq!(observer.get(), 0);

    writer.set(7);

    assert_eq!(observer.get(), 7);
}

#[test]
fn foreign_remove_resets_other_binding_to_default() {
    let prefs = memory_prefs();
    let writer = prefs.store("count", 5u32);
    let observer = prefs.store("count", 5u32);

    writer.set(7);
    assert_eq!(observer.get(), 7);

    writer.remove();
    assert_eq!(observer.get(), 5);
}

#[test]
fn propagation_does_not_cross_keys() {
    let prefs = memory_prefs();
    let tags = prefs.store("tags", vec!["casual".to_string()]);
    let users = prefs.store("users", Vec::<String>::new());

    assert!(users.get().is_empty());
    tags.set(vec!["esports".to_string()]);

    assert!(users.get().is_empty());
}

#[test]
fn clones_share_the_binding() {
    let prefs = memory_prefs();
    let store = prefs.store("count", 0u32);
    let clone = store.clone();

    store.set(7);

    assert_eq!(clone.get(), 7);
}
