//! Testing utilities for Ramify.
//!
//! This module provides hooks that make assertions about dispatch easy.
//!
//! # Features
//!
//! - [`RecordingHook`]: Records a snapshot of every event it receives
//! - [`CountingHook`]: Counts invocations
//! - [`StopHook`]: Stops propagation
//! - [`FailingHook`]: Fails with a fixed message

use parking_lot::Mutex;
use ramify_core::{
    BoxError, Event, EventPath, Hook, HookRef, HookResult, Map, Payload, Value,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Hook
// ============================================================================

/// What a [`RecordingHook`] saw of one invocation.
///
/// Events are shared handles whose current path keeps changing while they
/// bubble, so the hook copies the interesting fields at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// The event itself.
    pub event: Event,
    /// Event name.
    pub name: String,
    /// Path the hook was reached at.
    pub current_path: Option<EventPath>,
    /// Path the event was targeted at.
    pub original_path: Option<EventPath>,
    /// Broadcast root, for broadcast events.
    pub broadcast_path: Option<EventPath>,
    /// Payload items at call time.
    pub payload: Map<String, Value>,
}

/// A hook that records every event it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHook::new();
/// space.subscribe_to("save", path, recorder.hook())?;
///
/// event.trigger_sync()?;
///
/// assert_eq!(recorder.count(), 1);
/// assert_eq!(recorder.paths(), ["doc"]);
/// ```
#[derive(Clone)]
pub struct RecordingHook {
    records: Arc<Mutex<Vec<RecordedEvent>>>,
    result: HookResult,
    hook: HookRef,
}

impl RecordingHook {
    /// Create a new recording hook that returns `Next`.
    pub fn new() -> Self {
        Self::with_result(HookResult::Next)
    }

    /// Create a recording hook that returns a specific result.
    pub fn with_result(result: HookResult) -> Self {
        let records = Arc::new(Mutex::new(Vec::new()));
        let hook = HookRef::new(Recorder {
            records: records.clone(),
            result: result.clone(),
        });
        Self {
            records,
            result,
            hook,
        }
    }

    /// The subscribable handle. Every call returns the same hook.
    pub fn hook(&self) -> HookRef {
        self.hook.clone()
    }

    /// The result this hook returns.
    pub fn result(&self) -> &HookResult {
        &self.result
    }

    /// Get a clone of the records.
    pub fn records(&self) -> Vec<RecordedEvent> {
        self.records.lock().clone()
    }

    /// The recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.records.lock().iter().map(|r| r.event.clone()).collect()
    }

    /// The current path of each recorded event, as text.
    pub fn paths(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| {
                r.current_path
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Clear all records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for RecordingHook {
    fn default() -> Self {
        Self::new()
    }
}

struct Recorder {
    records: Arc<Mutex<Vec<RecordedEvent>>>,
    result: HookResult,
}

impl Hook for Recorder {
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        self.records.lock().push(RecordedEvent {
            event: event.clone(),
            name: event.name().to_owned(),
            current_path: event.current_path(),
            original_path: event.original_path(),
            broadcast_path: event.broadcast_path(),
            payload: payload.snapshot(),
        });
        Ok(self.result.clone())
    }
}

// ============================================================================
// Counting Hook
// ============================================================================

/// A hook that counts invocations.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHook::new();
/// space.subscribe_to("save", path, counter.hook())?;
///
/// event.trigger_sync()?;
///
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone)]
pub struct CountingHook {
    count: Arc<AtomicUsize>,
    hook: HookRef,
}

impl CountingHook {
    /// Create a new counting hook.
    pub fn new() -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let hook = HookRef::from_fn(move |_: &Event, _: &Payload| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        Self { count, hook }
    }

    /// The subscribable handle. Every call returns the same hook.
    pub fn hook(&self) -> HookRef {
        self.hook.clone()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingHook {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Stop / Failing hooks
// ============================================================================

/// A hook that always stops propagation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopHook;

impl Hook for StopHook {
    fn on_event(&self, _event: &Event, _payload: &Payload) -> Result<HookResult, BoxError> {
        Ok(HookResult::Stop)
    }
}

/// A hook that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingHook {
    message: String,
}

impl FailingHook {
    /// Create a failing hook.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Hook for FailingHook {
    fn on_event(&self, _event: &Event, _payload: &Payload) -> Result<HookResult, BoxError> {
        Err(self.message.clone().into())
    }
}
