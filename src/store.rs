//! Typed preference bindings
//!
//! [`Prefs`] owns one durable namespace plus its change bus and hands out
//! [`PrefStore`] bindings, one per logical preference. A binding keeps a
//! typed in-memory value and the durable entry for its key in sync: reads
//! decode the stored JSON or fall back to a default, writes are mirrored to
//! storage before they are considered committed, and writes made through
//! any other binding of the same key arrive over the bus and update the
//! value in place.

use crate::app_name::AppName;
use crate::bus::{ChangeBus, ChangeEvent, ImportCompleted};
use crate::storage::{FileStorage, StorageBackend};
use crate::transfer::{self, ImportOptions};
use iced::Subscription;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};

/// Entry point to the preference layer: one durable namespace plus its
/// change bus. Cheap to clone; clones share both.
#[derive(Clone)]
pub struct Prefs {
    storage: Arc<dyn StorageBackend>,
    bus: ChangeBus,
}

impl Prefs {
    /// Open the preference namespace for an application, backed by a file
    /// under the platform config directory
    pub fn new(app_name: &AppName) -> Self {
        Self::with_storage(Arc::new(FileStorage::new(app_name)))
    }

    /// Bind the preference layer to an explicit storage backend
    pub fn with_storage(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            bus: ChangeBus::new(),
        }
    }

    /// Bind a typed store to a durable key, with a literal default
    pub fn store<T>(&self, key: impl Into<String>, default: T) -> PrefStore<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.store_with(key, move || default.clone())
    }

    /// Bind a typed store to a durable key, with a default producer that is
    /// resolved each time a default is actually needed
    pub fn store_with<T>(
        &self,
        key: impl Into<String>,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> PrefStore<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        PrefStore::new(
            Arc::clone(&self.storage),
            self.bus.clone(),
            key.into(),
            Arc::new(default),
        )
    }

    /// Serialize the whole namespace into one JSON document
    pub fn export_all(&self) -> Option<String> {
        transfer::export_all(self.storage.as_ref())
    }

    /// Serialize the whole namespace and drop a copy in the user's download
    /// directory; the file write is best-effort and does not affect the
    /// returned document
    pub fn export_to_file(&self, filename: &str) -> Option<String> {
        transfer::export_to_file(self.storage.as_ref(), filename)
    }

    /// Restore the namespace from an exported document
    ///
    /// Every live binding whose key appears in the document picks the new
    /// value up through the bus; no reload is needed.
    pub fn import_all(&self, document: &str, options: ImportOptions) -> bool {
        transfer::import_all(self.storage.as_ref(), &self.bus, document, options)
    }

    /// Subscription yielding the completion signal of every bulk import
    pub fn on_import(&self) -> Subscription<ImportCompleted> {
        self.bus.listen_imports()
    }

    /// The change bus shared by every binding created from this value
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

/// One durable key bound to one typed in-memory value
///
/// Cheap to clone; clones share the binding (and its identity, so a write
/// through one clone is not re-delivered to another).
pub struct PrefStore<T> {
    key: String,
    origin: usize,
    storage: Arc<dyn StorageBackend>,
    bus: ChangeBus,
    default: Arc<dyn Fn() -> T + Send + Sync>,
    value: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for PrefStore<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            origin: self.origin,
            storage: Arc::clone(&self.storage),
            bus: self.bus.clone(),
            default: Arc::clone(&self.default),
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> PrefStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn new(
        storage: Arc<dyn StorageBackend>,
        bus: ChangeBus,
        key: String,
        default: Arc<dyn Fn() -> T + Send + Sync>,
    ) -> Self {
        let origin = bus.allocate_origin();
        let store = Self {
            key,
            origin,
            storage,
            bus,
            default,
            value: Arc::new(Mutex::new(None)),
        };
        store.attach();
        store
    }

    /// Register this binding's applier on the bus, so foreign writes to the
    /// key update the in-memory value without any call on the owning side
    fn attach(&self) {
        let slot = Arc::downgrade(&self.value);
        let default = Arc::clone(&self.default);

        self.bus.subscribe(
            self.key.clone(),
            self.origin,
            Box::new(move |event: &ChangeEvent| {
                let Some(slot) = slot.upgrade() else {
                    return false;
                };

                let next = decode_or(event.new_value.as_deref(), &default);
                if let Ok(mut slot) = slot.lock() {
                    *slot = Some(next);
                }
                true
            }),
        );
    }

    /// The durable key this binding is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    fn default_value(&self) -> T {
        (self.default)()
    }

    /// Decode the current durable entry, falling back to the default when
    /// the entry is absent, storage is unavailable, or decoding fails
    ///
    /// Does not touch the in-memory value. Never panics.
    pub fn read(&self) -> T {
        match self.storage.get(&self.key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|_| self.default_value()),
            None => self.default_value(),
        }
    }

    /// The current in-memory value, initialized from [`read`](Self::read)
    /// on first access
    pub fn get(&self) -> T {
        match self.value.lock() {
            Ok(mut slot) => slot.get_or_insert_with(|| self.read()).clone(),
            Err(_) => self.read(),
        }
    }

    /// Replace the value
    ///
    /// The new value is serialized and mirrored to durable storage before
    /// the call returns; a failed write is swallowed and the in-memory value
    /// is updated regardless. Other bindings of the key are notified only
    /// when the write became durable.
    pub fn set(&self, next: T) {
        let old_value = self.storage.get(&self.key);

        let mut persisted = None;
        if let Ok(raw) = serde_json::to_string(&next)
            && self.storage.set(&self.key, &raw)
        {
            persisted = Some(raw);
        }

        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(next);
        }

        if let Some(new_value) = persisted {
            self.bus.publish(
                Some(self.origin),
                &ChangeEvent {
                    key: self.key.clone(),
                    old_value,
                    new_value: Some(new_value),
                },
            );
        }
    }

    /// Replace the value with a function of the previous value
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        self.set(f(self.get()));
    }

    /// Delete the durable entry and reset the in-memory value to the
    /// default
    pub fn remove(&self) {
        let old_value = self.storage.get(&self.key);
        self.storage.remove(&self.key);

        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(self.default_value());
        }

        self.bus.publish(
            Some(self.origin),
            &ChangeEvent {
                key: self.key.clone(),
                old_value,
                new_value: None,
            },
        );
    }

    /// Subscription yielding the decoded value every time another binding
    /// (or a bulk import) writes this key. Writes made through this binding
    /// are not re-delivered.
    pub fn listen(&self) -> Subscription<T> {
        struct ListenState<T> {
            key: String,
            origin: usize,
            bus: ChangeBus,
            default: Arc<dyn Fn() -> T + Send + Sync>,
        }

        impl<T> std::hash::Hash for ListenState<T> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.key.hash(state);
                self.origin.hash(state);
                std::any::type_name::<T>().hash(state);
            }
        }

        impl<T> Clone for ListenState<T> {
            fn clone(&self) -> Self {
                Self {
                    key: self.key.clone(),
                    origin: self.origin,
                    bus: self.bus.clone(),
                    default: Arc::clone(&self.default),
                }
            }
        }

        fn create_stream<T>(state: &ListenState<T>) -> iced::futures::stream::BoxStream<'static, T>
        where
            T: Clone + DeserializeOwned + Send + Sync + 'static,
        {
            use iced::futures::StreamExt;

            let default = Arc::clone(&state.default);
            Box::pin(
                crate::bus::change_stream(
                    state.key.clone(),
                    Some(state.origin),
                    state.bus.clone(),
                )
                .map(move |event| decode_or(event.new_value.as_deref(), &default)),
            )
        }

        let state = ListenState::<T> {
            key: self.key.clone(),
            origin: self.origin,
            bus: self.bus.clone(),
            default: Arc::clone(&self.default),
        };

        Subscription::run_with(state, create_stream::<T>)
    }
}

/// Decode a serialized value, substituting the default for an absent entry
/// or a decode failure
fn decode_or<T: DeserializeOwned>(raw: Option<&str>, default: &Arc<dyn Fn() -> T + Send + Sync>) -> T {
    match raw {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| default()),
        None => default(),
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
