//! Whole-namespace export and import
//!
//! Bulk transfer operates beneath every preference binding, at the level of
//! the entire durable namespace: export snapshots it as one portable JSON
//! document, import restores it wholesale or by merge. Each imported key is
//! re-broadcast on the change bus so live bindings pick the new values up
//! without a reload, and one completion signal follows the last key.

use crate::bus::{ChangeBus, ChangeEvent, ImportCompleted};
use crate::storage::StorageBackend;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for [`import_all`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportOptions {
    /// Keep entries absent from the document instead of clearing the
    /// namespace first
    pub merge: bool,
}

/// Serialize every durable entry into one ordered, pretty-printed JSON
/// object
///
/// Values that decode as JSON are embedded as-is; anything else is carried
/// as a JSON string of the raw text, so a corrupt entry never breaks the
/// export. Returns `None` when the document cannot be serialized.
pub fn export_all(storage: &dyn StorageBackend) -> Option<String> {
    let mut document = BTreeMap::new();
    for key in storage.keys() {
        let Some(raw) = storage.get(&key) else {
            continue;
        };
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        document.insert(key, value);
    }

    match serde_json::to_string_pretty(&document) {
        Ok(contents) => Some(contents),
        Err(e) => {
            eprintln!("Failed to serialize preference export: {}", e);
            None
        }
    }
}

/// [`export_all`], plus a best-effort copy written to the user's download
/// directory. The file write failing does not affect the returned document.
pub fn export_to_file(storage: &dyn StorageBackend, filename: &str) -> Option<String> {
    let document = export_all(storage)?;

    let path = download_dir().join(filename);
    if let Err(e) = fs::write(&path, &document) {
        eprintln!("Failed to write preference export to {}: {}", path.display(), e);
    }

    Some(document)
}

fn download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Restore a namespace from a document produced by [`export_all`]
///
/// The document must be a JSON object; anything else is rejected without
/// touching storage. With `merge` unset the namespace is cleared first.
/// Keys are applied one at a time with no rollback: a failed write aborts
/// with `false` and leaves the keys already written in place. Every applied
/// key is re-broadcast as an un-originated change event, so every live
/// binding of that key updates; one [`ImportCompleted`] signal follows the
/// last key.
pub fn import_all(
    storage: &dyn StorageBackend,
    bus: &ChangeBus,
    document: &str,
    options: ImportOptions,
) -> bool {
    let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(document) else {
        return false;
    };

    if !options.merge {
        storage.clear();
    }

    for (key, value) in &entries {
        let old_value = storage.get(key);
        let Ok(raw) = serde_json::to_string(value) else {
            return false;
        };
        if !storage.set(key, &raw) {
            eprintln!("Failed to persist imported preference: {}", key);
            return false;
        }

        bus.publish(
            None,
            &ChangeEvent {
                key: key.clone(),
                old_value,
                new_value: Some(raw),
            },
        );
    }

    bus.publish_import_completed(ImportCompleted {
        keys: entries.len(),
    });
    true
}

#[cfg(test)]
#[path = "transfer_test.rs"]
mod tests;
