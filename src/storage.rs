//! Durable key-value storage backends
//!
//! The preference layer talks to storage through [`StorageBackend`], a small
//! port with string keys and serialized string values. Production binds it to
//! a JSON file under the platform config directory; tests bind it to an
//! in-memory map so they run without a filesystem.

use crate::app_name::AppName;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable, string-keyed storage for serialized preference values
///
/// Mutations are best-effort: `set` reports success as a boolean and
/// `remove`/`clear` swallow failures, so a full disk or read-only profile
/// never takes the preference layer down with it.
pub trait StorageBackend: Send + Sync {
    /// Get the raw serialized value for a key
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw serialized value for a key; `false` when the write
    /// could not be made durable
    fn set(&self, key: &str, value: &str) -> bool;

    /// Delete the entry for a key
    fn remove(&self, key: &str);

    /// All keys currently present, in stable (sorted) order
    fn keys(&self) -> Vec<String>;

    /// Delete every entry
    fn clear(&self);
}

/// Get the storage directory for the application
///
/// Uses platform-specific conventions:
/// - Linux: `$XDG_CONFIG_HOME/<app>/prefs` or `~/.config/<app>/prefs`
/// - macOS: `~/Library/Application Support/<app>/prefs`
/// - Windows: `%APPDATA%\<app>\prefs`
pub fn storage_dir(app_name: &AppName) -> PathBuf {
    directories::ProjectDirs::from(
        app_name.qualifier.as_str(),
        app_name.organization.as_str(),
        app_name.application.as_str(),
    )
    .map(|dirs| dirs.config_local_dir().to_path_buf())
    .unwrap_or_else(|| PathBuf::from("."))
    .join("prefs")
}

/// File-backed storage: the whole namespace in one pretty-printed JSON
/// object file
///
/// Entries are cached in memory and every mutation rewrites the file before
/// returning, so a value accepted by [`StorageBackend::set`] is durable by
/// the time the call completes.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the namespace file for an application
    pub fn new(app_name: &AppName) -> Self {
        Self::at_path(storage_dir(app_name).join("prefs.json"))
    }

    /// Open a namespace file at an explicit path
    ///
    /// An unreadable or corrupt file degrades to an empty namespace.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_namespace(&path).unwrap_or_else(|e| {
            eprintln!("Failed to load preferences: {}", e);
            BTreeMap::new()
        });

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> bool {
        match save_namespace(&self.path, entries) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("Failed to persist preferences: {}", e);
                false
            }
        }
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
                self.persist(&entries)
            }
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock()
            && entries.remove(key).is_some()
        {
            self.persist(&entries);
        }
    }

    fn keys(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
            self.persist(&entries);
        }
    }
}

/// Load a namespace file from disk
///
/// Returns an empty namespace if the file doesn't exist or is empty.
fn load_namespace(path: &Path) -> Result<BTreeMap<String, String>, String> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read namespace file: {}", e))?;

    if contents.is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse namespace file: {}", e))
}

/// Save a namespace file to disk, creating the storage directory if needed
fn save_namespace(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create storage directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(entries)
        .map_err(|e| format!("Failed to serialize namespace: {}", e))?;

    fs::write(path, contents).map_err(|e| format!("Failed to write namespace file: {}", e))
}

/// In-memory storage for tests and headless use
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory namespace
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn keys(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
