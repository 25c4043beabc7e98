//! # Evented objects
//!
//! Capability traits for things that take part in event dispatch, and
//! [`Evented`], a component that gives any owner a place in an event space.
//!
//! - [`EventSpawner`] - creates prepared events
//! - [`EventSource`] - triggers and broadcasts events from its own path
//! - [`EventTarget`] - subscribes hooks at its own path
//!
//! ```rust,ignore
//! struct Document {
//!     events: Evented,
//! }
//!
//! let doc = Document {
//!     events: Evented::new(space.clone(), "doc>42".parse()?),
//! };
//! doc.events.subscribe_to("save", HookRef::from_fn(|event, _| { /* ... */ }))?;
//! doc.events.trigger_sync("save")?;
//!
//! // Moving the document moves its subscriptions along.
//! doc.events.set_event_path("archive>42".parse()?)?;
//! ```

use parking_lot::Mutex;
use ramify_core::{
    CallResult, DispatchError, Event, EventError, EventPath, EventSpace, HookRef, Sender,
};
use std::fmt;

/// Creates events prepared for dispatch.
pub trait EventSpawner {
    /// Creates an event named `name`.
    fn spawn_event(&self, name: &str) -> Result<Event, EventError>;
}

/// Triggers and broadcasts events from a location it knows.
pub trait EventSource {
    /// Triggers an event named `name`, bubbling toward the top-level segment.
    fn trigger_sync(&self, name: &str) -> Result<CallResult, DispatchError>;

    /// Broadcasts an event named `name` to every subscribed path below.
    fn broadcast_sync(&self, name: &str) -> Result<CallResult, DispatchError>;
}

/// Subscribes hooks at a location it knows.
pub trait EventTarget {
    /// Subscribes `hook` to events named `name`.
    fn subscribe_to(&self, name: &str, hook: HookRef) -> Result<&Self, EventError>;

    /// Removes subscriptions made through this target. `None` matches any.
    fn unsubscribe_from(&self, name: Option<&str>, hook: Option<&HookRef>) -> &Self;

    /// Subscribes a hook that runs at most once.
    fn subscribe_to_until_triggered(&self, name: &str, hook: HookRef) -> Result<&Self, EventError>;

    /// Subscribes on behalf of `delegate`, a path under this target.
    fn delegate_subscription_to(
        &self,
        name: &str,
        delegate: EventPath,
        hook: HookRef,
    ) -> Result<&Self, EventError>;
}

impl EventSpawner for EventSpace {
    fn spawn_event(&self, name: &str) -> Result<Event, EventError> {
        EventSpace::spawn_event(self, name)
    }
}

struct EventedState {
    path: EventPath,
    subscriptions: Vec<(String, HookRef)>,
}

/// A location in an event space with its own list of subscriptions.
///
/// Events spawned through it are targeted at its path and carry its sender.
/// Moving it with [`set_event_path`](Evented::set_event_path) moves every
/// subscription made through it.
pub struct Evented {
    space: EventSpace,
    base_path: Option<EventPath>,
    sender: Option<Sender>,
    state: Mutex<EventedState>,
}

impl Evented {
    /// Places a new evented object at `path`.
    pub fn new(space: EventSpace, path: EventPath) -> Self {
        Self {
            space,
            base_path: None,
            sender: None,
            state: Mutex::new(EventedState {
                path,
                subscriptions: Vec::new(),
            }),
        }
    }

    /// Requires this object's path to stay under `base`.
    pub fn with_base_path(mut self, base: EventPath) -> Result<Self, EventError> {
        let path = self.event_path();
        if !base.is_root_of(&path) {
            return Err(EventError::PathNotRelative {
                base: base.to_string(),
                path: path.to_string(),
            });
        }
        self.base_path = Some(base);
        Ok(self)
    }

    /// Sets the sender attached to spawned events.
    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }

    /// The space this object lives in.
    pub fn event_space(&self) -> &EventSpace {
        &self.space
    }

    /// The current path.
    pub fn event_path(&self) -> EventPath {
        self.state.lock().path.clone()
    }

    /// Number of live subscriptions made through this object.
    pub fn subscription_count(&self) -> usize {
        let mut state = self.state.lock();
        self.prune(&mut state);
        state.subscriptions.len()
    }

    /// Moves the object, re-subscribing its hooks at the new path.
    pub fn set_event_path(&self, path: EventPath) -> Result<&Self, EventError> {
        if let Some(base) = &self.base_path {
            if !base.is_root_of(&path) {
                return Err(EventError::PathNotRelative {
                    base: base.to_string(),
                    path: path.to_string(),
                });
            }
        }

        let mut state = self.state.lock();
        self.prune(&mut state);
        for (name, hook) in &state.subscriptions {
            self.space
                .unsubscribe_from(Some(name.as_str()), Some(&state.path), Some(hook))
                .subscribe_to(name, path.clone(), hook.clone())?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from = %state.path,
            to = %path,
            subscriptions = state.subscriptions.len(),
            "moved evented object"
        );

        state.path = path;
        Ok(self)
    }

    /// Forgets subscriptions that left the space on their own, such as
    /// once-hooks that already fired.
    fn prune(&self, state: &mut EventedState) {
        let path = &state.path;
        state
            .subscriptions
            .retain(|(name, hook)| self.space.is_subscribed(name, path, hook));
    }

    fn record(&self, name: &str, hook: HookRef) {
        self.state
            .lock()
            .subscriptions
            .push((name.to_owned(), hook));
    }
}

impl EventSpawner for Evented {
    fn spawn_event(&self, name: &str) -> Result<Event, EventError> {
        let event = self.space.spawn_event(name)?;
        event.set_target_path(self.event_path());
        if let Some(sender) = &self.sender {
            event.set_sender(sender.clone());
        }
        Ok(event)
    }
}

impl EventSource for Evented {
    fn trigger_sync(&self, name: &str) -> Result<CallResult, DispatchError> {
        self.spawn_event(name)?.trigger_sync()
    }

    fn broadcast_sync(&self, name: &str) -> Result<CallResult, DispatchError> {
        self.spawn_event(name)?.broadcast_sync()
    }
}

impl EventTarget for Evented {
    fn subscribe_to(&self, name: &str, hook: HookRef) -> Result<&Self, EventError> {
        self.space
            .subscribe_to(name, self.event_path(), hook.clone())?;
        self.record(name, hook);
        Ok(self)
    }

    fn unsubscribe_from(&self, name: Option<&str>, hook: Option<&HookRef>) -> &Self {
        let mut state = self.state.lock();
        let path = state.path.clone();
        let mut removed_one = false;
        state.subscriptions.retain(|(own_name, own_hook)| {
            let name_matches = name.is_none_or(|name| name == own_name.as_str());
            let hook_matches = hook.is_none_or(|hook| hook == own_hook);
            // An exact pair only removes its first instance.
            let exact = name.is_some() && hook.is_some();
            if !name_matches || !hook_matches || (exact && removed_one) {
                return true;
            }
            self.space
                .unsubscribe_from(Some(own_name.as_str()), Some(&path), Some(own_hook));
            removed_one = true;
            false
        });
        drop(state);
        self
    }

    fn subscribe_to_until_triggered(&self, name: &str, hook: HookRef) -> Result<&Self, EventError> {
        let wrapper = self
            .space
            .subscribe_to_until_triggered(name, self.event_path(), hook)?;
        self.record(name, wrapper);
        Ok(self)
    }

    fn delegate_subscription_to(
        &self,
        name: &str,
        delegate: EventPath,
        hook: HookRef,
    ) -> Result<&Self, EventError> {
        let wrapper =
            self.space
                .delegate_subscription_to(name, self.event_path(), delegate, hook)?;
        self.record(name, wrapper);
        Ok(self)
    }
}

impl fmt::Debug for Evented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Evented")
            .field("space", &self.space.name())
            .field("path", &state.path)
            .field("base_path", &self.base_path)
            .field("subscriptions", &state.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingHook, RecordingHook};
    use std::sync::Arc;

    fn ep(s: &str) -> EventPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_spawned_events_are_targeted_with_sender() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space, ep("doc>1")).with_sender(Arc::new(7_u32));
        let event = evented.spawn_event("save").unwrap();
        assert_eq!(event.original_path(), Some(ep("doc>1")));
        assert_eq!(event.sender_as::<u32>().as_deref(), Some(&7));
    }

    #[test]
    fn test_subscribe_and_trigger() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space.clone(), ep("doc>1"));
        let counter = CountingHook::new();
        evented.subscribe_to("save", counter.hook()).unwrap();
        assert_eq!(space.handler_count("save", &ep("doc>1")), 1);

        evented.trigger_sync("save").unwrap();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_moving_resubscribes() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space.clone(), ep("doc>1"));
        let recorder = RecordingHook::new();
        evented.subscribe_to("save", recorder.hook()).unwrap();

        evented.set_event_path(ep("archive>1")).unwrap();
        assert_eq!(space.handler_count("save", &ep("doc>1")), 0);
        assert_eq!(space.handler_count("save", &ep("archive>1")), 1);

        evented.trigger_sync("save").unwrap();
        assert_eq!(recorder.paths(), ["archive>1"]);
    }

    #[test]
    fn test_base_path_is_enforced() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space, ep("doc>1"))
            .with_base_path(ep("doc"))
            .unwrap();
        assert!(evented.set_event_path(ep("doc>2")).is_ok());
        assert!(matches!(
            evented.set_event_path(ep("archive>2")),
            Err(EventError::PathNotRelative { .. })
        ));
        assert_eq!(evented.event_path(), ep("doc>2"));
    }

    #[test]
    fn test_unsubscribe_only_own_hooks() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space.clone(), ep("doc>1"));
        let foreign = CountingHook::new().hook();
        space.subscribe_to("save", ep("doc>1"), foreign.clone()).unwrap();

        let own = CountingHook::new().hook();
        evented
            .subscribe_to("save", own.clone())
            .unwrap()
            .subscribe_to("load", own.clone())
            .unwrap();

        evented.unsubscribe_from(Some("save"), None);
        assert!(space.is_subscribed("save", &ep("doc>1"), &foreign));
        assert!(!space.is_subscribed("save", &ep("doc>1"), &own));
        assert!(space.is_subscribed("load", &ep("doc>1"), &own));

        evented.unsubscribe_from(None, None);
        assert_eq!(evented.subscription_count(), 0);
        assert_eq!(space.subscribed_paths("load"), Vec::<EventPath>::new());
    }

    #[test]
    fn test_fired_once_subscription_is_not_moved() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space.clone(), ep("a"));
        let counter = CountingHook::new();
        evented
            .subscribe_to_until_triggered("ping", counter.hook())
            .unwrap();

        evented.trigger_sync("ping").unwrap();
        assert!(space.is_empty());
        assert_eq!(evented.subscription_count(), 0);

        evented.set_event_path(ep("b")).unwrap();
        assert!(space.is_empty());
        assert_eq!(space.handler_count("ping", &ep("b")), 0);

        evented.trigger_sync("ping").unwrap();
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_once_subscription_survives_move() {
        let space = EventSpace::isolated();
        let evented = Evented::new(space.clone(), ep("a"));
        let counter = CountingHook::new();
        evented
            .subscribe_to_until_triggered("ping", counter.hook())
            .unwrap();
        evented.set_event_path(ep("b")).unwrap();

        evented.trigger_sync("ping").unwrap();
        evented.trigger_sync("ping").unwrap();
        assert_eq!(counter.count(), 1);
        assert!(space.is_empty());
    }
}
