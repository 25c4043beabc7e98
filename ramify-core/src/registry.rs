//! Subscription storage for an event space.
//!
//! Hooks are kept per path, then per event name, in subscription order.
//! Paths iterate in segment order, which is the order broadcasts visit them.
//! Empty hook lists and empty path nodes are removed as soon as they appear.

use crate::{event_path::EventPath, hook::HookRef};
use std::collections::{BTreeMap, HashMap};

/// Hooks subscribed at one path, keyed by event name.
type NameTable = HashMap<String, Vec<HookRef>>;

/// Path → event name → hooks.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionRegistry {
    paths: BTreeMap<EventPath, NameTable>,
}

impl SubscriptionRegistry {
    /// Appends a hook to the list at `(path, name)`.
    pub(crate) fn insert(&mut self, name: &str, path: EventPath, hook: HookRef) {
        self.paths
            .entry(path)
            .or_default()
            .entry(name.to_owned())
            .or_default()
            .push(hook);
    }

    /// A snapshot of the hooks at `(path, name)`.
    pub(crate) fn hooks(&self, name: &str, path: &EventPath) -> Vec<HookRef> {
        self.paths
            .get(path)
            .and_then(|names| names.get(name))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn handler_count(&self, name: &str, path: &EventPath) -> usize {
        self.paths
            .get(path)
            .and_then(|names| names.get(name))
            .map_or(0, Vec::len)
    }

    pub(crate) fn contains(&self, name: &str, path: &EventPath, hook: &HookRef) -> bool {
        self.paths
            .get(path)
            .and_then(|names| names.get(name))
            .is_some_and(|hooks| hooks.contains(hook))
    }

    /// Paths with at least one hook for `name`, in registry order.
    pub(crate) fn paths_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EventPath> + 'a {
        self.paths
            .iter()
            .filter(move |(_, names)| names.contains_key(name))
            .map(|(path, _)| path)
    }

    /// Removes the first instance of `hook` at `(path, name)`.
    pub(crate) fn remove_hook(&mut self, name: &str, path: &EventPath, hook: &HookRef) {
        let Some(names) = self.paths.get_mut(path) else {
            return;
        };
        if let Some(hooks) = names.get_mut(name) {
            if let Some(index) = hooks.iter().position(|h| h == hook) {
                hooks.remove(index);
            }
            if hooks.is_empty() {
                names.remove(name);
            }
        }
        if names.is_empty() {
            self.paths.remove(path);
        }
    }

    /// Removes every hook at `(path, name)`.
    pub(crate) fn remove_list(&mut self, name: &str, path: &EventPath) {
        let Some(names) = self.paths.get_mut(path) else {
            return;
        };
        names.remove(name);
        if names.is_empty() {
            self.paths.remove(path);
        }
    }

    /// Removes every hook at `path`.
    pub(crate) fn remove_path(&mut self, path: &EventPath) {
        self.paths.remove(path);
    }

    /// Removes the first instance of `hook` from every list at `path`.
    pub(crate) fn remove_hook_at_path(&mut self, path: &EventPath, hook: &HookRef) {
        let names: Vec<String> = match self.paths.get(path) {
            Some(names) => names.keys().cloned().collect(),
            None => return,
        };
        for name in names {
            self.remove_hook(&name, path, hook);
        }
    }

    /// Removes `name` at every path.
    pub(crate) fn remove_name(&mut self, name: &str) {
        self.paths.retain(|_, names| {
            names.remove(name);
            !names.is_empty()
        });
    }

    /// Removes the first instance of `hook` from the `name` list at every path.
    pub(crate) fn remove_hook_by_name(&mut self, name: &str, hook: &HookRef) {
        let paths: Vec<EventPath> = self.paths_for(name).cloned().collect();
        for path in paths {
            self.remove_hook(name, &path, hook);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.paths.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
