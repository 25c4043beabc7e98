//! # Event spaces
//!
//! An [`EventSpace`] is an isolated dispatch domain: it owns a subscription
//! registry and spawns the events dispatched through it. It also references
//! an [`EventStack`] and a [`PayloadStore`], which are the process-wide ones
//! for [`EventSpace::new`] and fresh ones for [`EventSpace::isolated`].
//!
//! ```rust,ignore
//! let space = EventSpace::builder()
//!     .name("documents")
//!     .broadcast_order(BroadcastOrder::MainFirst)
//!     .isolated()
//!     .build();
//!
//! space.subscribe_to("save", Path::parse("doc")?, HookRef::from_fn(|event, _| {
//!     println!("saving {:?}", event.original_path());
//! }))?;
//!
//! space.spawn_event("save")?.trigger_sync_at(Path::parse("doc>42")?)?;
//! ```
//!
//! # Re-entrancy
//!
//! The registry lock is only held while reading or editing subscriptions.
//! [`EventSpace::call_handlers`] snapshots the hook list first, so hooks may
//! subscribe, unsubscribe and dispatch further events; changes apply to later
//! dispatches only.

use crate::{
    error::{BoxError, DispatchError, EventError},
    event::{Event, EventKind},
    event_path::EventPath,
    hook::{Hook, HookRef, HookResult},
    payload::{Payload, PayloadStore},
    registry::SubscriptionRegistry,
    stack::EventStack,
};
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc, OnceLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

// ============================================================================
// Configuration
// ============================================================================

/// Order in which a broadcast triggers the events it spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastOrder {
    /// Subscribed descendants in registry order, then the main event.
    #[default]
    DescendantsFirst,
    /// The main event, then subscribed descendants in registry order.
    MainFirst,
}

/// Configuration of an [`EventSpace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceConfig {
    /// Label used in log output.
    pub name: String,
    /// Order of broadcast dispatch.
    pub broadcast_order: BroadcastOrder,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            broadcast_order: BroadcastOrder::default(),
        }
    }
}

/// Outcome of dispatching an event at one or more paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallResult {
    /// Whether a hook returned [`HookResult::Stop`].
    pub stopped: bool,
    /// Number of hooks invoked, including one that stopped.
    pub executed_count: usize,
}

impl CallResult {
    /// A result where dispatch ran to completion.
    pub const fn continued(executed_count: usize) -> Self {
        Self {
            stopped: false,
            executed_count,
        }
    }

    /// A result where dispatch was stopped.
    pub const fn stopped(executed_count: usize) -> Self {
        Self {
            stopped: true,
            executed_count,
        }
    }
}

// ============================================================================
// EventSpace
// ============================================================================

struct SpaceInner {
    config: SpaceConfig,
    registry: Mutex<SubscriptionRegistry>,
    stack: EventStack,
    payloads: PayloadStore,
}

/// A confined dispatch domain. Cloning shares the space.
#[derive(Clone)]
pub struct EventSpace {
    inner: Arc<SpaceInner>,
}

impl EventSpace {
    /// Creates a space using the process-wide event stack and payload store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a space with its own event stack and payload store.
    pub fn isolated() -> Self {
        Self::builder().isolated().build()
    }

    /// Starts configuring a space.
    pub fn builder() -> EventSpaceBuilder {
        EventSpaceBuilder::new()
    }

    /// The process-wide space.
    pub fn global() -> &'static EventSpace {
        static GLOBAL: OnceLock<EventSpace> = OnceLock::new();
        GLOBAL.get_or_init(EventSpace::new)
    }

    fn from_parts(config: SpaceConfig, stack: EventStack, payloads: PayloadStore) -> Self {
        Self {
            inner: Arc::new(SpaceInner {
                config,
                registry: Mutex::new(SubscriptionRegistry::default()),
                stack,
                payloads,
            }),
        }
    }

    fn downgrade(&self) -> Weak<SpaceInner> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<SpaceInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// The space's label.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// The space's configuration.
    pub fn config(&self) -> &SpaceConfig {
        &self.inner.config
    }

    /// The stack events are pushed on while their hooks run.
    pub fn stack(&self) -> &EventStack {
        &self.inner.stack
    }

    /// The store pending payload items are read from.
    pub fn payload_store(&self) -> &PayloadStore {
        &self.inner.payloads
    }

    /// Whether both handles refer to the same space.
    pub fn ptr_eq(&self, other: &EventSpace) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Creates an event of [`EventKind::STANDARD`].
    ///
    /// The event carries the items pending for `name` in the payload store,
    /// and the last event on the stack as its original event.
    pub fn spawn_event(&self, name: &str) -> Result<Event, EventError> {
        self.spawn_event_of_kind(name, EventKind::STANDARD)
    }

    /// Creates an event of the given kind. See [`spawn_event`](Self::spawn_event).
    pub fn spawn_event_of_kind(&self, name: &str, kind: EventKind) -> Result<Event, EventError> {
        let event = Event::new(name, kind, self.clone())?;
        if let Some(items) = self.inner.payloads.payload(name) {
            event.set_payload_items(items);
        }
        event.set_original_event(self.inner.stack.last_event());
        Ok(event)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Subscribes `hook` to events named `name` reaching `path`.
    ///
    /// Hooks at one path run in subscription order. Subscribing the same
    /// hook twice makes it run twice.
    pub fn subscribe_to(
        &self,
        name: &str,
        path: impl Into<EventPath>,
        hook: HookRef,
    ) -> Result<&Self, EventError> {
        if name.is_empty() {
            return Err(EventError::EmptyEventName);
        }
        let path = path.into();

        #[cfg(feature = "tracing")]
        tracing::trace!(space = self.name(), event = name, path = %path, "subscribing hook");

        self.inner.registry.lock().insert(name, path, hook);
        Ok(self)
    }

    /// Removes subscriptions. Each argument narrows what is removed:
    ///
    /// | name | path | hook | removes |
    /// |------|------|------|---------|
    /// | ✓ | ✓ | ✓ | the first instance of `hook` at `(path, name)` |
    /// | ✓ | ✓ |   | every hook at `(path, name)` |
    /// |   | ✓ | ✓ | the first instance of `hook` under every name at `path` |
    /// |   | ✓ |   | every hook at `path` |
    /// | ✓ |   | ✓ | the first instance of `hook` under `name` at every path |
    /// | ✓ |   |   | every hook under `name` |
    /// |   |   | * | everything |
    ///
    /// Removing something that is not subscribed does nothing.
    pub fn unsubscribe_from(
        &self,
        name: Option<&str>,
        path: Option<&EventPath>,
        hook: Option<&HookRef>,
    ) -> &Self {
        let mut registry = self.inner.registry.lock();
        match (name, path, hook) {
            (Some(name), Some(path), Some(hook)) => registry.remove_hook(name, path, hook),
            (Some(name), Some(path), None) => registry.remove_list(name, path),
            (None, Some(path), Some(hook)) => registry.remove_hook_at_path(path, hook),
            (None, Some(path), None) => registry.remove_path(path),
            (Some(name), None, Some(hook)) => registry.remove_hook_by_name(name, hook),
            (Some(name), None, None) => registry.remove_name(name),
            (None, None, _) => registry.clear(),
        }
        self
    }

    /// Removes every subscription.
    pub fn clear(&self) -> &Self {
        self.unsubscribe_from(None, None, None)
    }

    /// Subscribes a hook that unsubscribes itself the first time it runs.
    ///
    /// Returns the subscribed wrapper, which can be passed to
    /// [`unsubscribe_from`](Self::unsubscribe_from) to cancel early.
    pub fn subscribe_to_until_triggered(
        &self,
        name: &str,
        path: impl Into<EventPath>,
        hook: HookRef,
    ) -> Result<HookRef, EventError> {
        let path = path.into();
        let once: Arc<OnceHook> = Arc::new_cyclic(|me| OnceHook {
            me: me.clone(),
            space: self.downgrade(),
            name: name.to_owned(),
            inner: hook,
            fired: AtomicBool::new(false),
        });
        let wrapper = HookRef::from_arc(once);
        self.subscribe_to(name, path, wrapper.clone())?;
        Ok(wrapper)
    }

    /// Subscribes at `capture` on behalf of `delegate`, a path at or under it.
    ///
    /// The hook runs, with a fork of the event whose current path is
    /// `delegate`, only for events targeted at or under `delegate`, or
    /// broadcast from a path on the same branch as `delegate`.
    ///
    /// Returns the subscribed wrapper, for unsubscribing.
    pub fn delegate_subscription_to(
        &self,
        name: &str,
        capture: impl Into<EventPath>,
        delegate: impl Into<EventPath>,
        hook: HookRef,
    ) -> Result<HookRef, EventError> {
        let capture = capture.into();
        let delegate = delegate.into();
        if !capture.is_root_of(&delegate) {
            return Err(EventError::DelegateNotRelative {
                capture: capture.to_string(),
                delegate: delegate.to_string(),
            });
        }
        let wrapper = HookRef::new(DelegateHook {
            delegate,
            inner: hook,
        });
        self.subscribe_to(name, capture, wrapper.clone())?;
        Ok(wrapper)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Paths with hooks for `name`, in registry order.
    pub fn subscribed_paths(&self, name: &str) -> Vec<EventPath> {
        self.inner.registry.lock().paths_for(name).cloned().collect()
    }

    /// Subscribed paths for `name` at or under `path`, in registry order.
    pub fn paths_relative_to(&self, name: &str, path: &EventPath) -> Vec<EventPath> {
        self.inner
            .registry
            .lock()
            .paths_for(name)
            .filter(|candidate| path.is_root_of(candidate))
            .cloned()
            .collect()
    }

    /// Number of hooks at `(path, name)`.
    pub fn handler_count(&self, name: &str, path: &EventPath) -> usize {
        self.inner.registry.lock().handler_count(name, path)
    }

    /// Whether `hook` is subscribed at `(path, name)`.
    pub fn is_subscribed(&self, name: &str, path: &EventPath, hook: &HookRef) -> bool {
        self.inner.registry.lock().contains(name, path, hook)
    }

    /// Whether the space has no subscriptions at all.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.lock().is_empty()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Calls the hooks subscribed at the event's current path, in order.
    ///
    /// The event is on the stack while each hook runs; a hook returning
    /// [`HookResult::Deferred`] keeps it there until the token settles. The
    /// first `Stop` ends the call, and a hook error is returned immediately.
    pub fn call_handlers(&self, event: &Event) -> Result<CallResult, DispatchError> {
        let path = event
            .current_path()
            .ok_or_else(|| EventError::Untargeted(event.name().to_owned()))?;
        let hooks = self.inner.registry.lock().hooks(event.name(), &path);
        let payload = event.payload();

        let mut result = CallResult::default();
        for hook in hooks {
            let entry = self.inner.stack.push_event(event.clone());

            #[cfg(feature = "tracing")]
            tracing::trace!(
                space = self.name(),
                event = event.name(),
                path = %path,
                index = result.executed_count,
                "calling hook"
            );

            let outcome = hook.call(event, &payload);
            result.executed_count += 1;
            match outcome {
                Ok(HookResult::Next) => drop(entry),
                Ok(HookResult::Deferred(deferred)) => {
                    deferred.on_settled(move || entry.unlink());
                }
                Ok(HookResult::Stop) => {
                    drop(entry);
                    result.stopped = true;
                    return Ok(result);
                }
                Err(source) => {
                    drop(entry);

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        space = self.name(),
                        event = event.name(),
                        path = %path,
                        error = %source,
                        "hook failed"
                    );

                    return Err(DispatchError::Hook {
                        event: event.name().to_owned(),
                        path: path.to_string(),
                        source,
                    });
                }
            }
        }
        Ok(result)
    }
}

impl Default for EventSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for EventSpace {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EventSpace {}

impl fmt::Debug for EventSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSpace")
            .field("config", &self.inner.config)
            .field("stack", &self.inner.stack)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EventSpaceBuilder
// ============================================================================

/// Builder for [`EventSpace`].
#[derive(Debug, Default)]
pub struct EventSpaceBuilder {
    config: SpaceConfig,
    stack: Option<EventStack>,
    payloads: Option<PayloadStore>,
    isolated: bool,
}

impl EventSpaceBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the broadcast order.
    pub fn broadcast_order(mut self, order: BroadcastOrder) -> Self {
        self.config.broadcast_order = order;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: SpaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses the given event stack.
    pub fn stack(mut self, stack: EventStack) -> Self {
        self.stack = Some(stack);
        self
    }

    /// Uses the given payload store.
    pub fn payload_store(mut self, payloads: PayloadStore) -> Self {
        self.payloads = Some(payloads);
        self
    }

    /// Uses a fresh stack and store unless others are given explicitly.
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Builds the space.
    pub fn build(self) -> EventSpace {
        let isolated = self.isolated;
        let stack = self.stack.unwrap_or_else(|| {
            if isolated {
                EventStack::new()
            } else {
                EventStack::global().clone()
            }
        });
        let payloads = self.payloads.unwrap_or_else(|| {
            if isolated {
                PayloadStore::new()
            } else {
                PayloadStore::global().clone()
            }
        });
        EventSpace::from_parts(self.config, stack, payloads)
    }
}

// ============================================================================
// Wrapper hooks
// ============================================================================

/// Runs its hook once, unsubscribing itself beforehand.
///
/// The subscription is removed at the event's current path, which is where
/// dispatch found it, so the wrapper keeps working after being moved.
struct OnceHook {
    me: Weak<OnceHook>,
    space: Weak<SpaceInner>,
    name: String,
    inner: HookRef,
    fired: AtomicBool,
}

impl Hook for OnceHook {
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        if self.fired.swap(true, Ordering::AcqRel) {
            return Ok(HookResult::Next);
        }
        if let (Some(space), Some(me), Some(path)) = (
            EventSpace::upgrade(&self.space),
            self.me.upgrade(),
            event.current_path(),
        ) {
            let me = HookRef::from_arc(me);
            space.unsubscribe_from(Some(&self.name), Some(&path), Some(&me));
        }
        self.inner.call(event, payload)
    }
}

/// Forwards events concerning `delegate` to its hook.
struct DelegateHook {
    delegate: EventPath,
    inner: HookRef,
}

impl DelegateHook {
    fn concerns(&self, event: &Event) -> bool {
        let targeted = event
            .original_path()
            .is_some_and(|original| self.delegate.is_root_of(&original));
        let broadcast = event.broadcast_path().is_some_and(|root| {
            self.delegate.is_root_of(&root) || root.is_root_of(&self.delegate)
        });
        targeted || broadcast
    }
}

impl Hook for DelegateHook {
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        if !self.concerns(event) {
            return Ok(HookResult::Next);
        }
        let forked = event.fork(Some(self.delegate.clone()));
        self.inner.call(&forked, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Deferred;
    use std::sync::Mutex as StdMutex;

    fn ep(s: &str) -> EventPath {
        s.parse().unwrap()
    }

    fn noop() -> HookRef {
        HookRef::from_fn(|_: &Event, _: &Payload| {})
    }

    fn recorder(log: &Arc<StdMutex<Vec<String>>>, label: &'static str) -> HookRef {
        let log = log.clone();
        HookRef::from_fn(move |_: &Event, _: &Payload| {
            log.lock().unwrap().push(label.to_owned());
        })
    }

    #[test]
    fn test_subscribe_rejects_empty_name() {
        let space = EventSpace::isolated();
        assert_eq!(
            space.subscribe_to("", ep("a"), noop()).err(),
            Some(EventError::EmptyEventName)
        );
        assert_eq!(
            space.spawn_event("").err(),
            Some(EventError::EmptyEventName)
        );
    }

    #[test]
    fn test_unsubscribe_exact_hook() {
        let space = EventSpace::isolated();
        let (a, b) = (noop(), noop());
        space
            .subscribe_to("e", ep("p"), a.clone())
            .unwrap()
            .subscribe_to("e", ep("p"), b.clone())
            .unwrap();

        space.unsubscribe_from(Some("e"), Some(&ep("p")), Some(&a));
        assert!(!space.is_subscribed("e", &ep("p"), &a));
        assert!(space.is_subscribed("e", &ep("p"), &b));

        // absent combinations are ignored
        space
            .unsubscribe_from(Some("e"), Some(&ep("p")), Some(&a))
            .unsubscribe_from(Some("x"), Some(&ep("q")), None)
            .unsubscribe_from(None, Some(&ep("nowhere")), Some(&b));
        assert_eq!(space.handler_count("e", &ep("p")), 1);
    }

    #[test]
    fn test_unsubscribe_by_path_and_name() {
        let space = EventSpace::isolated();
        let a = noop();
        space.subscribe_to("e", ep("p"), a.clone()).unwrap();
        space.subscribe_to("f", ep("p"), a.clone()).unwrap();
        space.subscribe_to("e", ep("q"), a.clone()).unwrap();

        space.unsubscribe_from(Some("e"), None, Some(&a));
        assert!(space.subscribed_paths("e").is_empty());
        assert_eq!(space.subscribed_paths("f"), vec![ep("p")]);

        space.unsubscribe_from(None, Some(&ep("p")), None);
        assert!(space.is_empty());

        space.subscribe_to("e", ep("p"), a.clone()).unwrap();
        space.clear();
        assert!(space.is_empty());
    }

    #[test]
    fn test_call_handlers_stops_on_stop() {
        let space = EventSpace::isolated();
        let log = Arc::new(StdMutex::new(Vec::new()));
        space.subscribe_to("e", ep("p"), recorder(&log, "first")).unwrap();
        space
            .subscribe_to("e", ep("p"), HookRef::from_fn(|_: &Event, _: &Payload| false))
            .unwrap();
        space.subscribe_to("e", ep("p"), recorder(&log, "third")).unwrap();

        let event = space.spawn_event("e").unwrap();
        event.set_target_path(ep("p"));
        let result = space.call_handlers(&event).unwrap();
        assert_eq!(result, CallResult::stopped(2));
        assert_eq!(*log.lock().unwrap(), ["first"]);
    }

    #[test]
    fn test_call_handlers_propagates_errors() {
        let space = EventSpace::isolated();
        let log = Arc::new(StdMutex::new(Vec::new()));
        space
            .subscribe_to(
                "e",
                ep("p"),
                HookRef::from_fn(|_: &Event, _: &Payload| Err::<(), _>("broken")),
            )
            .unwrap();
        space.subscribe_to("e", ep("p"), recorder(&log, "after")).unwrap();

        let event = space.spawn_event("e").unwrap();
        event.set_target_path(ep("p"));
        let err = space.call_handlers(&event).unwrap_err();
        assert!(matches!(err, DispatchError::Hook { ref path, .. } if path == "p"));
        assert!(log.lock().unwrap().is_empty());
        assert!(space.stack().is_empty());
    }

    #[test]
    fn test_event_is_on_stack_while_hook_runs() {
        let space = EventSpace::isolated();
        let seen = Arc::new(StdMutex::new(None));
        let s = seen.clone();
        space
            .subscribe_to(
                "e",
                ep("p"),
                HookRef::from_fn(move |event: &Event, _: &Payload| {
                    *s.lock().unwrap() = Some(event.space().stack().last_event() == Some(event.clone()));
                }),
            )
            .unwrap();
        space.spawn_event("e").unwrap().trigger_sync_at(ep("p")).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(true));
        assert!(space.stack().is_empty());
    }

    #[test]
    fn test_deferred_result_keeps_stack_entry() {
        let space = EventSpace::isolated();
        let settle = Arc::new(StdMutex::new(None));
        let s = settle.clone();
        space
            .subscribe_to(
                "e",
                ep("p"),
                HookRef::from_fn(move |_: &Event, _: &Payload| {
                    let (deferred, guard) = Deferred::new();
                    *s.lock().unwrap() = Some(guard);
                    deferred
                }),
            )
            .unwrap();

        space.spawn_event("e").unwrap().trigger_sync_at(ep("p")).unwrap();
        assert_eq!(space.stack().len(), 1);

        let guard = settle.lock().unwrap().take().unwrap();
        guard.resolve();
        assert!(space.stack().is_empty());
    }

    #[test]
    fn test_snapshot_isolates_current_dispatch() {
        let space = EventSpace::isolated();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let late = recorder(&log, "late");
        let l = log.clone();
        space
            .subscribe_to(
                "e",
                ep("p"),
                HookRef::from_fn(move |event: &Event, _: &Payload| {
                    l.lock().unwrap().push("first".to_owned());
                    event
                        .space()
                        .subscribe_to("e", ep("p"), late.clone())
                        .map(|_| ())
                }),
            )
            .unwrap();

        let event = space.spawn_event("e").unwrap();
        event.set_target_path(ep("p"));
        space.call_handlers(&event).unwrap();
        assert_eq!(*log.lock().unwrap(), ["first"]);
        assert_eq!(space.handler_count("e", &ep("p")), 2);
    }

    #[test]
    fn test_until_triggered_runs_once() {
        let space = EventSpace::isolated();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let wrapper = space
            .subscribe_to_until_triggered("e", ep("p"), recorder(&log, "once"))
            .unwrap();
        assert!(space.is_subscribed("e", &ep("p"), &wrapper));

        space.spawn_event("e").unwrap().trigger_sync_at(ep("p")).unwrap();
        space.spawn_event("e").unwrap().trigger_sync_at(ep("p")).unwrap();
        assert_eq!(*log.lock().unwrap(), ["once"]);
        assert!(space.is_empty());
    }

    #[test]
    fn test_until_triggered_can_be_cancelled() {
        let space = EventSpace::isolated();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let wrapper = space
            .subscribe_to_until_triggered("e", ep("p"), recorder(&log, "once"))
            .unwrap();
        space.unsubscribe_from(Some("e"), Some(&ep("p")), Some(&wrapper));
        space.spawn_event("e").unwrap().trigger_sync_at(ep("p")).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delegate_requires_relative_path() {
        let space = EventSpace::isolated();
        let err = space
            .delegate_subscription_to("e", ep("a>b"), ep("c"), noop())
            .unwrap_err();
        assert!(matches!(err, EventError::DelegateNotRelative { .. }));
    }

    #[test]
    fn test_delegate_filters_and_forks() {
        let space = EventSpace::isolated();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let s = seen.clone();
        space
            .delegate_subscription_to(
                "e",
                ep("app"),
                ep("app>users"),
                HookRef::from_fn(move |event: &Event, _: &Payload| {
                    s.lock()
                        .unwrap()
                        .push(event.current_path().unwrap().to_string());
                }),
            )
            .unwrap();

        space
            .spawn_event("e")
            .unwrap()
            .trigger_sync_at(ep("app>users>42"))
            .unwrap();
        space
            .spawn_event("e")
            .unwrap()
            .trigger_sync_at(ep("app>groups>1"))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), ["app>users"]);
    }

    #[test]
    fn test_paths_relative_to() {
        let space = EventSpace::isolated();
        for path in ["r", "r>x", "r>x>y", "r>z", "r>x>w", "s", "rr"] {
            space.subscribe_to("e", ep(path), noop()).unwrap();
        }
        let paths: Vec<String> = space
            .paths_relative_to("e", &ep("r"))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(paths, ["r", "r>x", "r>x>w", "r>x>y", "r>z"]);
    }

    #[test]
    fn test_spawn_reads_pending_payload_and_stack() {
        let payloads = PayloadStore::new();
        payloads.set_item("e", "user", "ann");
        let space = EventSpace::builder()
            .isolated()
            .payload_store(payloads.clone())
            .build();

        let first = space.spawn_event("e").unwrap();
        let second = space.spawn_event("e").unwrap();
        assert_eq!(first.payload_item("user"), Some("ann".into()));
        assert_eq!(second.payload_item("user"), Some("ann".into()));
        assert!(!first.payload().ptr_eq(&second.payload()));

        payloads.delete_item("e", "user");
        assert_eq!(space.spawn_event("e").unwrap().payload_item("user"), None);

        let outer = space.spawn_event("outer").unwrap();
        let _entry = space.stack().push_event(outer.clone());
        assert_eq!(space.spawn_event("inner").unwrap().original_event(), Some(outer));
    }

    #[test]
    fn test_builder_config() {
        let space = EventSpace::builder()
            .name("docs")
            .broadcast_order(BroadcastOrder::MainFirst)
            .isolated()
            .build();
        assert_eq!(space.name(), "docs");
        assert_eq!(space.config().broadcast_order, BroadcastOrder::MainFirst);
        assert_eq!(EventSpace::isolated().config(), &SpaceConfig::default());
    }
}
