//! # Events
//!
//! An [`Event`] is a named message addressed to a path in an
//! [`EventSpace`]. It is spawned by the space, targeted, then either
//! triggered (bubbling from the target up to the top-level segment) or
//! broadcast (dispatched to every subscribed path under the target).
//!
//! ```rust,ignore
//! let event = space.spawn_event("save")?;
//! event
//!     .set_target_path(Path::parse("doc>42>title")?)
//!     .set_payload_item("value", "Draft");
//! event.trigger_sync()?;
//! ```
//!
//! `Event` is a handle: clones share state and compare equal. Use
//! [`Event::fork`] for a new event carrying the same data.

use crate::{
    error::{DispatchError, EventError},
    event_path::EventPath,
    payload::Payload,
    space::{BroadcastOrder, CallResult, EventSpace},
};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::{any::Any, fmt, sync::Arc};

/// Opaque reference to whatever sent an event.
pub type Sender = Arc<dyn Any + Send + Sync>;

/// Discriminator used to find typed ancestors in the causal chain.
///
/// Kinds are preserved by [`Event::fork`] and by broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(&'static str);

impl EventKind {
    /// Kind of events spawned with [`EventSpace::spawn_event`].
    pub const STANDARD: EventKind = EventKind("standard");

    /// Declares a kind.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The kind's name.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl Default for EventKind {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone)]
struct EventState {
    can_bubble: bool,
    original_event: Option<Event>,
    default_prevented: bool,
    handled: bool,
    sender: Option<Sender>,
    payload: Payload,
    current_path: Option<EventPath>,
    original_path: Option<EventPath>,
    broadcast_path: Option<EventPath>,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            can_bubble: true,
            original_event: None,
            default_prevented: false,
            handled: false,
            sender: None,
            payload: Payload::new(),
            current_path: None,
            original_path: None,
            broadcast_path: None,
        }
    }
}

struct EventInner {
    name: String,
    kind: EventKind,
    space: EventSpace,
    state: Mutex<EventState>,
}

/// A named message dispatched through an [`EventSpace`].
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

impl Event {
    pub(crate) fn new(name: &str, kind: EventKind, space: EventSpace) -> Result<Self, EventError> {
        if name.is_empty() {
            return Err(EventError::EmptyEventName);
        }
        Ok(Self::with_state(
            name.to_owned(),
            kind,
            space,
            EventState::default(),
        ))
    }

    fn with_state(name: String, kind: EventKind, space: EventSpace, state: EventState) -> Self {
        Self {
            inner: Arc::new(EventInner {
                name,
                kind,
                space,
                state: Mutex::new(state),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EventState> {
        self.inner.state.lock()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The event name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The event kind.
    pub fn kind(&self) -> EventKind {
        self.inner.kind
    }

    /// The space this event is dispatched in.
    pub fn space(&self) -> &EventSpace {
        &self.inner.space
    }

    /// Whether triggering bubbles up the path.
    pub fn can_bubble(&self) -> bool {
        self.state().can_bubble
    }

    /// The event that was being handled when this one was spawned.
    pub fn original_event(&self) -> Option<Event> {
        self.state().original_event.clone()
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    pub fn is_default_prevented(&self) -> bool {
        self.state().default_prevented
    }

    /// Whether at least one hook ran during a trigger.
    pub fn is_handled(&self) -> bool {
        self.state().handled
    }

    /// The sender, if set.
    pub fn sender(&self) -> Option<Sender> {
        self.state().sender.clone()
    }

    /// The sender, if set and of type `T`.
    pub fn sender_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.sender()?.downcast::<T>().ok()
    }

    /// The payload handle. Shared with forks.
    pub fn payload(&self) -> Payload {
        self.state().payload.clone()
    }

    /// A copy of one payload item.
    pub fn payload_item(&self, name: &str) -> Option<Value> {
        self.payload().get(name)
    }

    /// The path dispatch is currently at. Shrinks while bubbling.
    pub fn current_path(&self) -> Option<EventPath> {
        self.state().current_path.clone()
    }

    /// The path the event was targeted at.
    pub fn original_path(&self) -> Option<EventPath> {
        self.state().original_path.clone()
    }

    /// The root of the broadcast that spawned this event, if any.
    pub fn broadcast_path(&self) -> Option<EventPath> {
        self.state().broadcast_path.clone()
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Targets the event: sets both the original and current path.
    pub fn set_target_path(&self, path: impl Into<EventPath>) -> &Self {
        let path = path.into();
        let mut state = self.state();
        state.current_path = Some(path.clone());
        state.original_path = Some(path);
        self
    }

    /// Moves the current path without changing the original one.
    pub fn set_current_path(&self, path: impl Into<EventPath>) -> &Self {
        self.state().current_path = Some(path.into());
        self
    }

    /// Marks the event as part of a broadcast rooted at `path`.
    pub fn set_broadcast_path(&self, path: impl Into<EventPath>) -> &Self {
        self.state().broadcast_path = Some(path.into());
        self
    }

    /// Sets one payload item.
    pub fn set_payload_item(&self, name: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.payload().set(name, value);
        self
    }

    /// Sets several payload items.
    pub fn set_payload_items<I, K>(&self, items: I) -> &Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.payload().extend(items);
        self
    }

    /// Sets the sender.
    pub fn set_sender(&self, sender: Sender) -> &Self {
        self.state().sender = Some(sender);
        self
    }

    /// Allows or forbids bubbling.
    pub fn allow_bubbling(&self, allow: bool) -> &Self {
        self.state().can_bubble = allow;
        self
    }

    /// Flags the event's default action as prevented.
    pub fn prevent_default(&self) -> &Self {
        self.state().default_prevented = true;
        self
    }

    /// Sets or clears the causal origin.
    pub fn set_original_event(&self, original: Option<Event>) -> &Self {
        self.state().original_event = original;
        self
    }

    // ========================================================================
    // Causal chain
    // ========================================================================

    /// Walks the chain of original events and returns the first match.
    pub fn find_original_event<P>(&self, mut predicate: P) -> Option<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        let mut cursor = self.original_event();
        while let Some(event) = cursor {
            if predicate(&event) {
                return Some(event);
            }
            cursor = event.original_event();
        }
        None
    }

    /// The closest original event named `name`.
    pub fn original_event_by_name(&self, name: &str) -> Option<Event> {
        self.find_original_event(|event| event.name() == name)
    }

    /// The closest original event of `kind`.
    pub fn original_event_by_kind(&self, kind: EventKind) -> Option<Event> {
        self.find_original_event(|event| event.kind() == kind)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// A new event with the same name, kind, space, paths, causal origin,
    /// `handled` and default-prevented flags. Payload and sender are shared,
    /// not copied. The fork can always bubble.
    ///
    /// The fork's current path is `current_path` when given, else a copy of
    /// this event's.
    pub fn fork(&self, current_path: Option<EventPath>) -> Event {
        let mut state = self.state().clone();
        state.can_bubble = true;
        if let Some(path) = current_path {
            state.current_path = Some(path);
        }
        Self::with_state(
            self.inner.name.clone(),
            self.inner.kind,
            self.inner.space.clone(),
            state,
        )
    }

    /// Triggers the event at its current path.
    ///
    /// Bubbling events call hooks at the current path, then at each ancestor
    /// up to the top-level segment, until a hook stops propagation. Events
    /// that cannot bubble, and events targeted at a query, are dispatched
    /// exactly once.
    ///
    /// A bubbling event whose current path is the root has no levels to
    /// visit, so it calls nothing. This includes re-triggering an event that
    /// already bubbled out without targeting it again.
    pub fn trigger_sync(&self) -> Result<CallResult, DispatchError> {
        let space = self.space();
        let bubbles = {
            let state = self.state();
            let Some(target) = state.current_path.as_ref() else {
                return Err(EventError::Untargeted(self.inner.name.clone()).into());
            };
            let is_query = target.is_query()
                || state.original_path.as_ref().is_some_and(EventPath::is_query);
            let bubbles = state.can_bubble && !is_query;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                space = space.name(),
                event = %self.inner.name,
                path = %target,
                bubbles,
                "triggering event"
            );

            bubbles
        };

        if !bubbles {
            let result = space.call_handlers(self)?;
            if !result.stopped && result.executed_count > 0 {
                self.state().handled = true;
            }
            return Ok(result);
        }

        let mut total = CallResult::default();
        while self.has_levels_left() {
            let result = space.call_handlers(self)?;
            total.executed_count += result.executed_count;
            if result.stopped {
                total.stopped = true;
                break;
            }

            let mut state = self.state();
            if result.executed_count > 0 {
                state.handled = true;
            }
            if let Some(EventPath::Path(path)) = state.current_path.as_mut() {
                path.shrink();
            }
        }
        Ok(total)
    }

    /// Whether the bubbling current path still has a segment to visit.
    fn has_levels_left(&self) -> bool {
        matches!(
            self.state().current_path.as_ref(),
            Some(EventPath::Path(path)) if !path.is_empty()
        )
    }

    /// Targets the event at `path`, then triggers it.
    pub fn trigger_sync_at(&self, path: impl Into<EventPath>) -> Result<CallResult, DispatchError> {
        self.set_target_path(path);
        self.trigger_sync()
    }

    /// Broadcasts the event to every path subscribed under its current path.
    ///
    /// One non-bubbling event is spawned per subscribed descendant, plus a
    /// main event at the broadcast root that bubbles, so delegates above the
    /// root still see the broadcast. All of them carry this event's sender,
    /// a copy of its payload items and its original event. A stop in one
    /// branch does not affect the others; a hook error aborts the broadcast.
    pub fn broadcast_sync(&self) -> Result<CallResult, DispatchError> {
        let root = self
            .current_path()
            .ok_or_else(|| EventError::Untargeted(self.inner.name.clone()))?;
        let space = self.space();
        let (sender, items, original) = {
            let state = self.state();
            (
                state.sender.clone(),
                state.payload.snapshot(),
                state.original_event.clone(),
            )
        };

        // Children carry exactly the broadcaster's data; the payload store and
        // the stack are not consulted again.
        let spawn = |path: EventPath, bubbles: bool| -> Result<Event, EventError> {
            let event = Event::new(&self.inner.name, self.inner.kind, space.clone())?;
            event
                .allow_bubbling(bubbles)
                .set_broadcast_path(root.clone())
                .set_target_path(path)
                .set_payload_items(items.clone())
                .set_original_event(original.clone());
            if let Some(sender) = &sender {
                event.set_sender(sender.clone());
            }
            Ok(event)
        };

        let descendants = space
            .paths_relative_to(&self.inner.name, &root)
            .into_iter()
            .filter(|path| path != &root)
            .map(|path| spawn(path, false))
            .collect::<Result<Vec<_>, _>>()?;
        let main = spawn(root.clone(), true)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            space = space.name(),
            event = %self.inner.name,
            path = %root,
            targets = descendants.len() + 1,
            "broadcasting event"
        );

        let events = match space.config().broadcast_order {
            BroadcastOrder::DescendantsFirst => {
                descendants.into_iter().chain(std::iter::once(main)).collect::<Vec<_>>()
            }
            BroadcastOrder::MainFirst => std::iter::once(main).chain(descendants).collect(),
        };

        let mut total = CallResult::default();
        for event in &events {
            let result = event.trigger_sync()?;
            total.executed_count += result.executed_count;
            total.stopped |= result.stopped;
        }
        if total.executed_count > 0 {
            self.state().handled = true;
        }
        Ok(total)
    }

    /// Broadcasts the event from `path`.
    pub fn broadcast_sync_at(
        &self,
        path: impl Into<EventPath>,
    ) -> Result<CallResult, DispatchError> {
        self.set_target_path(path);
        self.broadcast_sync()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Event {}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Event")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("current_path", &state.current_path)
            .field("original_path", &state.original_path)
            .field("broadcast_path", &state.broadcast_path)
            .field("can_bubble", &state.can_bubble)
            .field("handled", &state.handled)
            .field("payload", &state.payload)
            .finish_non_exhaustive()
    }
}
