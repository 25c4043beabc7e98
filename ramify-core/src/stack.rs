//! Stack of events currently being handled.
//!
//! Every hook invocation pushes its event; the entry is removed when the hook
//! returns, or when its [`Deferred`](crate::Deferred) settles. Entries may be
//! removed in any order, which is why the stack sits on an [`OpenChain`]
//! rather than a `Vec`.
//!
//! The last event on the stack is the causal origin of any event spawned
//! while it is there.

use crate::{chain::LinkId, chain::OpenChain, event::Event};
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{Arc, OnceLock},
};

/// Shared stack of in-flight events. Cloning shares the stack.
#[derive(Clone, Default)]
pub struct EventStack {
    events: Arc<Mutex<OpenChain<Event>>>,
}

impl EventStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide stack.
    pub fn global() -> &'static EventStack {
        static GLOBAL: OnceLock<EventStack> = OnceLock::new();
        GLOBAL.get_or_init(EventStack::new)
    }

    /// Pushes an event. It stays on the stack until the returned entry is
    /// unlinked or dropped.
    #[must_use = "the event is removed from the stack as soon as the entry is dropped"]
    pub fn push_event(&self, event: Event) -> StackEntry {
        let link = self.events.lock().push_value(event);
        StackEntry {
            stack: self.clone(),
            link: Some(link),
        }
    }

    /// The most recently pushed event still on the stack.
    pub fn last_event(&self) -> Option<Event> {
        self.events.lock().last_value().cloned()
    }

    /// Events on the stack, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().values()
    }

    /// Number of events on the stack.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    fn release(&self, link: LinkId) {
        // The value is dropped after the lock is released.
        let released = self.events.lock().release(link);
        drop(released);
    }
}

impl fmt::Debug for EventStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStack")
            .field("len", &self.len())
            .finish()
    }
}

/// An event's place on an [`EventStack`].
pub struct StackEntry {
    stack: EventStack,
    link: Option<LinkId>,
}

impl StackEntry {
    /// Removes the event from the stack.
    pub fn unlink(mut self) {
        if let Some(link) = self.link.take() {
            self.stack.release(link);
        }
    }

    /// Whether the event is still on the stack.
    pub fn is_linked(&self) -> bool {
        self.link
            .is_some_and(|link| self.stack.events.lock().is_linked(link))
    }
}

impl Drop for StackEntry {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            self.stack.release(link);
        }
    }
}

impl fmt::Debug for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEntry")
            .field("linked", &self.is_linked())
            .finish()
    }
}
