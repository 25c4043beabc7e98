#![allow(dead_code)]

use ramify::{Event, EventPath, HookRef, HookResult, Payload};
use std::sync::{Arc, Mutex};

// ============================================================================
// Paths
// ============================================================================

pub fn ep(text: &str) -> EventPath {
    text.parse().unwrap()
}

// ============================================================================
// Shared call log
// ============================================================================

/// Labels pushed by hooks, in call order.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// A hook that logs `label` and returns `result`.
    pub fn hook_with(&self, label: &str, result: HookResult) -> HookRef {
        let log = self.clone();
        let label = label.to_owned();
        HookRef::from_fn(move |_: &Event, _: &Payload| {
            log.push(label.clone());
            result.clone()
        })
    }

    /// A hook that logs `label`.
    pub fn hook(&self, label: &str) -> HookRef {
        self.hook_with(label, HookResult::Next)
    }

    /// A hook that logs `label@<current path>`.
    pub fn path_hook(&self, label: &str) -> HookRef {
        let log = self.clone();
        let label = label.to_owned();
        HookRef::from_fn(move |event: &Event, _: &Payload| {
            let path = event
                .current_path()
                .map(|path| path.to_string())
                .unwrap_or_default();
            log.push(format!("{label}@{path}"));
        })
    }
}
