//! Cross-context change notification
//!
//! A write that lands in durable storage must become observable by every
//! other live binding of the same key, the way a browser tab observes
//! another tab's storage writes. The bus models that implicit mechanism as
//! an explicit publish/subscribe channel keyed by storage key: writers
//! publish `(key, old, new)` and each subscriber registers a sink for
//! exactly one key. Bulk imports additionally emit a single completion
//! signal on a separate channel.

use iced::Subscription;
use iced::futures::channel::mpsc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A single durable-storage change: the affected key plus the serialized
/// value before and after. `None` means the entry was absent or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Signal emitted once after a bulk import has written every key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportCompleted {
    /// Number of keys the import wrote
    pub keys: usize,
}

/// A sink receives an event and reports whether it is still alive; dead
/// sinks are dropped at the next delivery. Sinks must not publish back into
/// the bus.
type Sink<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

struct Subscriber<E> {
    origin: usize,
    sink: Sink<E>,
}

#[derive(Default)]
struct Registry {
    by_key: HashMap<String, Vec<Subscriber<ChangeEvent>>>,
    import_listeners: Vec<Subscriber<ImportCompleted>>,
}

/// Publish/subscribe channel for durable-storage changes, keyed by storage
/// key. Cheap to clone; clones share the subscriber registry.
#[derive(Clone)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
    next_origin: Arc<AtomicUsize>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_origin: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Allocate an origin token. Events published under a token are not
    /// delivered to sinks registered under the same token, which keeps
    /// self-writes out of the notification path.
    pub(crate) fn allocate_origin(&self) -> usize {
        self.next_origin.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a sink for one key
    pub(crate) fn subscribe(&self, key: impl Into<String>, origin: usize, sink: Sink<ChangeEvent>) {
        if let Ok(mut registry) = self.registry.lock() {
            registry
                .by_key
                .entry(key.into())
                .or_default()
                .push(Subscriber { origin, sink });
        }
    }

    /// Register a sink for the import-completed signal
    pub(crate) fn subscribe_imports(&self, origin: usize, sink: Sink<ImportCompleted>) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.import_listeners.push(Subscriber { origin, sink });
        }
    }

    /// Deliver an event to every sink registered for its key, skipping the
    /// originating subscriber. Sinks that report themselves dead are removed.
    pub fn publish(&self, origin: Option<usize>, event: &ChangeEvent) {
        if let Ok(mut registry) = self.registry.lock()
            && let Some(subscribers) = registry.by_key.get_mut(&event.key)
        {
            subscribers.retain(|subscriber| {
                if Some(subscriber.origin) == origin {
                    return true;
                }
                (subscriber.sink)(event)
            });
        }
    }

    /// Deliver the import-completed signal to every import listener
    pub(crate) fn publish_import_completed(&self, completed: ImportCompleted) {
        if let Ok(mut registry) = self.registry.lock() {
            registry
                .import_listeners
                .retain(|subscriber| (subscriber.sink)(&completed));
        }
    }

    /// Subscription yielding every foreign change to `key`
    pub fn listen_key(&self, key: impl Into<String>) -> Subscription<ChangeEvent> {
        #[derive(Clone)]
        struct ListenKey {
            key: String,
            bus: ChangeBus,
        }

        impl std::hash::Hash for ListenKey {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.key.hash(state);
            }
        }

        fn create_stream(state: &ListenKey) -> iced::futures::stream::BoxStream<'static, ChangeEvent> {
            Box::pin(change_stream(state.key.clone(), None, state.bus.clone()))
        }

        let state = ListenKey {
            key: key.into(),
            bus: self.clone(),
        };

        Subscription::run_with(state, create_stream)
    }

    /// Subscription yielding the completion signal of every bulk import
    pub fn listen_imports(&self) -> Subscription<ImportCompleted> {
        #[derive(Clone)]
        struct ListenImports {
            bus: ChangeBus,
        }

        impl std::hash::Hash for ListenImports {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                "prefs-import-completed".hash(state);
            }
        }

        fn create_stream(
            state: &ListenImports,
        ) -> iced::futures::stream::BoxStream<'static, ImportCompleted> {
            Box::pin(import_stream(state.bus.clone()))
        }

        let state = ListenImports { bus: self.clone() };

        Subscription::run_with(state, create_stream)
    }
}

/// Creates a stream over the changes published for one key
///
/// The stream registers an ordinary bus sink that forwards into a channel;
/// when the stream is dropped the sink reports itself dead and is removed at
/// the next delivery. With `origin` set, the stream shares a binding's
/// identity and therefore skips that binding's own writes.
pub(crate) fn change_stream(
    key: String,
    origin: Option<usize>,
    bus: ChangeBus,
) -> impl iced::futures::Stream<Item = ChangeEvent> {
    use iced::futures::{SinkExt, StreamExt};

    iced::stream::channel(100, move |mut output: mpsc::Sender<ChangeEvent>| async move {
        let (sender, mut receiver) = mpsc::unbounded();
        let origin = origin.unwrap_or_else(|| bus.allocate_origin());
        bus.subscribe(
            key,
            origin,
            Box::new(move |event: &ChangeEvent| sender.unbounded_send(event.clone()).is_ok()),
        );

        while let Some(event) = receiver.next().await {
            if output.send(event).await.is_err() {
                break;
            }
        }
    })
}

/// Creates a stream over the import-completed signals
fn import_stream(bus: ChangeBus) -> impl iced::futures::Stream<Item = ImportCompleted> {
    use iced::futures::{SinkExt, StreamExt};

    iced::stream::channel(100, move |mut output: mpsc::Sender<ImportCompleted>| async move {
        let (sender, mut receiver) = mpsc::unbounded();
        let origin = bus.allocate_origin();
        bus.subscribe_imports(
            origin,
            Box::new(move |completed: &ImportCompleted| sender.unbounded_send(*completed).is_ok()),
        );

        while let Some(completed) = receiver.next().await {
            if output.send(completed).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
#[path = "bus_test.rs"]
mod tests;
