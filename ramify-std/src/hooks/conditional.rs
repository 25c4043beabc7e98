//! Conditional Hook - Execute hooks based on conditions.

use ramify_core::{BoxError, Event, Hook, HookResult, Payload};

/// A Hook that conditionally executes an inner Hook.
///
/// The inner hook is only executed if the condition function returns `true`.
/// When the condition is `false`, dispatch continues as if nothing ran.
///
/// # Example
///
/// ```rust,ignore
/// use ramify_std::hooks::ConditionalHook;
///
/// // Only react to events that have not been handled yet
/// let first_only = ConditionalHook::new(
///     |event: &Event, _: &Payload| !event.is_handled(),
///     AuditHook,
/// );
/// space.subscribe_to("save", path, HookRef::new(first_only))?;
/// ```
pub struct ConditionalHook<C, H> {
    condition: C,
    inner: H,
}

impl<C, H> ConditionalHook<C, H> {
    /// Create a new `ConditionalHook`.
    ///
    /// The inner hook will only be executed when `condition(event, payload)`
    /// returns `true`.
    pub fn new(condition: C, inner: H) -> Self {
        Self { condition, inner }
    }
}

impl<C, H> Hook for ConditionalHook<C, H>
where
    C: Fn(&Event, &Payload) -> bool + Send + Sync + 'static,
    H: Hook,
{
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        if (self.condition)(event, payload) {
            self.inner.on_event(event, payload)
        } else {
            Ok(HookResult::Next)
        }
    }
}

/// A Hook that executes one of two inner hooks based on a condition.
///
/// When the condition is `true`, the `then_hook` is executed.
/// When the condition is `false`, the `else_hook` is executed.
///
/// # Example
///
/// ```rust,ignore
/// let branch = BranchHook::new(
///     |event: &Event, _: &Payload| event.broadcast_path().is_some(),
///     BroadcastAudit,
///     TriggerAudit,
/// );
/// ```
pub struct BranchHook<C, T, E> {
    condition: C,
    then_hook: T,
    else_hook: E,
}

impl<C, T, E> BranchHook<C, T, E> {
    /// Create a new `BranchHook`.
    pub fn new(condition: C, then_hook: T, else_hook: E) -> Self {
        Self {
            condition,
            then_hook,
            else_hook,
        }
    }
}

impl<C, T, E> Hook for BranchHook<C, T, E>
where
    C: Fn(&Event, &Payload) -> bool + Send + Sync + 'static,
    T: Hook,
    E: Hook,
{
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        if (self.condition)(event, payload) {
            self.then_hook.on_event(event, payload)
        } else {
            self.else_hook.on_event(event, payload)
        }
    }
}
