//! Durable preference synchronization for Iced applications
//!
//! Binds typed application preferences to a durable, string-keyed JSON
//! namespace and keeps every live binding of a key in sync, the way a
//! browser keeps `localStorage` consistent across tabs.
//!
//! # Features
//!
//! - One typed value per durable key, with get/set/update/remove
//! - Defaults (literal or lazily produced) whenever storage is unavailable
//!   or an entry fails to decode; a corrupt preference never crashes the UI
//! - Change notification between bindings of the same key, with
//!   `Subscription` integration for reactive UIs
//! - Whole-namespace export/import as one portable JSON document
//! - Pluggable storage: a JSON file under the platform config directory in
//!   production, an in-memory map in tests
//!
//! # Example
//!
//! ```ignore
//! use iced_prefs::{AppName, Prefs};
//!
//! let prefs = Prefs::new(&AppName::new("com", "example", "myapp"));
//! let theme = prefs.store("theme", "light".to_string());
//!
//! theme.set("dark".to_string());
//! assert_eq!(theme.get(), "dark");
//!
//! // Snapshot every preference into one document, restore it elsewhere.
//! let document = prefs.export_all().unwrap();
//! prefs.import_all(&document, Default::default());
//! ```

mod app_name;
mod bus;
mod storage;
mod store;
mod transfer;

pub use app_name::AppName;
pub use bus::{ChangeBus, ChangeEvent, ImportCompleted};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, storage_dir};
pub use store::{PrefStore, Prefs};
pub use transfer::{ImportOptions, export_all, export_to_file, import_all};
