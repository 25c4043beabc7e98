//! Event payloads and pending payload items.
//!
//! - [`Payload`] - string-keyed values carried by an event, shared by forks
//! - [`PayloadStore`] - items merged into every event spawned under a name
//!
//! Items registered with [`set_next_payload_item`] stay in the process-wide
//! store until deleted; every matching spawn reads them.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

/// Key/value data attached to an event.
///
/// Cloning shares the underlying map: a hook writing an item through one
/// handle is visible through every fork of the event.
#[derive(Clone, Default)]
pub struct Payload {
    items: Arc<Mutex<Map<String, Value>>>,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload owning the given items.
    pub fn from_items(items: Map<String, Value>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    /// A copy of one item.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.items.lock().get(name).cloned()
    }

    /// Whether an item is present.
    pub fn contains(&self, name: &str) -> bool {
        self.items.lock().contains_key(name)
    }

    /// Sets one item, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.items.lock().insert(name.into(), value.into())
    }

    /// Sets several items.
    pub fn extend<I, K>(&self, items: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut map = self.items.lock();
        for (name, value) in items {
            map.insert(name.into(), value);
        }
    }

    /// Removes one item.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.items.lock().remove(name)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// A detached copy of every item.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.items.lock().clone()
    }

    /// Whether both handles share the same map.
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items.lock().iter()).finish()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(items: Map<String, Value>) -> Self {
        Self::from_items(items)
    }
}

/// Pending payload items keyed by event name.
///
/// Cloning shares the store.
#[derive(Clone, Default)]
pub struct PayloadStore {
    pending: Arc<Mutex<HashMap<String, Map<String, Value>>>>,
}

impl PayloadStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store.
    pub fn global() -> &'static PayloadStore {
        static GLOBAL: OnceLock<PayloadStore> = OnceLock::new();
        GLOBAL.get_or_init(PayloadStore::new)
    }

    /// Registers an item for events named `event_name`.
    pub fn set_item(
        &self,
        event_name: &str,
        item_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> &Self {
        self.pending
            .lock()
            .entry(event_name.to_owned())
            .or_default()
            .insert(item_name.into(), value.into());
        self
    }

    /// Registers several items for events named `event_name`.
    pub fn set_items<I, K>(&self, event_name: &str, items: I) -> &Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut pending = self.pending.lock();
        let entry = pending.entry(event_name.to_owned()).or_default();
        for (name, value) in items {
            entry.insert(name.into(), value);
        }
        self
    }

    /// Drops one pending item. Absent items are ignored.
    pub fn delete_item(&self, event_name: &str, item_name: &str) -> &Self {
        self.delete_items(event_name, [item_name])
    }

    /// Drops several pending items. Absent items are ignored.
    pub fn delete_items<'a, I>(&self, event_name: &str, item_names: I) -> &Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pending = self.pending.lock();
        if let Some(entry) = pending.get_mut(event_name) {
            for name in item_names {
                entry.remove(name);
            }
            if entry.is_empty() {
                pending.remove(event_name);
            }
        }
        self
    }

    /// Drops everything pending for `event_name`.
    pub fn clear_event(&self, event_name: &str) -> &Self {
        self.pending.lock().remove(event_name);
        self
    }

    /// A copy of the items pending for `event_name`, if any.
    pub fn payload(&self, event_name: &str) -> Option<Map<String, Value>> {
        self.pending.lock().get(event_name).cloned()
    }
}

impl fmt::Debug for PayloadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.pending.lock().iter()).finish()
    }
}

/// Registers an item for every subsequently spawned event named `event_name`
/// in spaces using the process-wide store.
pub fn set_next_payload_item(event_name: &str, item_name: impl Into<String>, value: impl Into<Value>) {
    PayloadStore::global().set_item(event_name, item_name, value);
}

/// Registers several items in the process-wide store.
pub fn set_next_payload_items<I, K>(event_name: &str, items: I)
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    PayloadStore::global().set_items(event_name, items);
}

/// Drops one item from the process-wide store.
pub fn delete_next_payload_item(event_name: &str, item_name: &str) {
    PayloadStore::global().delete_item(event_name, item_name);
}

/// Drops several items from the process-wide store.
pub fn delete_next_payload_items<'a, I>(event_name: &str, item_names: I)
where
    I: IntoIterator<Item = &'a str>,
{
    PayloadStore::global().delete_items(event_name, item_names);
}
