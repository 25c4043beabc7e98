//! # Hooks
//!
//! A hook is the unit of event handling in Ramify: it is subscribed to an
//! event name at a path and invoked with the event and its payload whenever
//! dispatch reaches that path.
//!
//! Hooks decide what happens next through a [`HookResult`]:
//!
//! - `Next` - keep dispatching
//! - `Stop` - halt the remaining hooks at this path and any further bubbling
//! - `Deferred` - keep dispatching, but hold the event on the event stack until
//!   the returned token settles
//!
//! Any closure `Fn(&Event, &Payload) -> R` where `R: IntoHookResult` can be
//! turned into a hook with [`HookRef::from_fn`]:
//!
//! ```rust,ignore
//! let hook = HookRef::from_fn(|event: &Event, _payload: &Payload| {
//!     println!("{} reached {:?}", event.name(), event.current_path());
//! });
//! space.subscribe_to("save", "doc>1".parse::<EventPath>()?, hook.clone())?;
//! ```

use crate::{deferred::Deferred, error::BoxError, event::Event, payload::Payload};
use std::{fmt, marker::PhantomData, sync::Arc};

/// What dispatch should do after a hook returns.
#[derive(Debug, Clone, Default)]
pub enum HookResult {
    /// Continue with the next hook.
    #[default]
    Next,
    /// Stop the remaining hooks at this path and further bubbling.
    Stop,
    /// Continue, keeping the event on the stack until the token settles.
    Deferred(Deferred),
}

impl HookResult {
    /// Whether this result halts dispatch.
    pub fn is_stop(&self) -> bool {
        matches!(self, HookResult::Stop)
    }
}

/// An event handler subscribed in an [`EventSpace`](crate::EventSpace).
///
/// Hooks run synchronously on the dispatching thread, in subscription order.
/// No registry lock is held while a hook runs, so hooks may subscribe,
/// unsubscribe, spawn and trigger other events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Hook`",
    label = "missing `Hook` implementation",
    note = "Implement `Hook`, or wrap a closure with `HookRef::from_fn`."
)]
pub trait Hook: Send + Sync + 'static {
    /// Called when dispatch reaches the path this hook is subscribed at.
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError>;
}

/// Conversion of a closure's return value into a [`HookResult`].
///
/// - `()` → `Next`
/// - `bool` → `true` = `Next`, `false` = `Stop`
/// - `HookResult` → as is
/// - `Deferred` → `HookResult::Deferred`
/// - `Result<T, E>` → the inner value, or the error
pub trait IntoHookResult {
    /// Performs the conversion.
    fn into_hook_result(self) -> Result<HookResult, BoxError>;
}

impl IntoHookResult for () {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(HookResult::Next)
    }
}

impl IntoHookResult for bool {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(if self {
            HookResult::Next
        } else {
            HookResult::Stop
        })
    }
}

impl IntoHookResult for HookResult {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(self)
    }
}

impl IntoHookResult for Deferred {
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        Ok(HookResult::Deferred(self))
    }
}

impl<T, E> IntoHookResult for Result<T, E>
where
    T: IntoHookResult,
    E: Into<BoxError>,
{
    fn into_hook_result(self) -> Result<HookResult, BoxError> {
        match self {
            Ok(value) => value.into_hook_result(),
            Err(err) => Err(err.into()),
        }
    }
}

/// A hook backed by a closure.
pub struct FnHook<F, R> {
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> Hook for FnHook<F, R>
where
    F: Fn(&Event, &Payload) -> R + Send + Sync + 'static,
    R: IntoHookResult + 'static,
{
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        (self.f)(event, payload).into_hook_result()
    }
}

/// Shared handle to a subscribed hook.
///
/// Identity is the allocation: clones of one `HookRef` are equal, two refs
/// built from equal closures are not. Unsubscribing matches by identity.
#[derive(Clone)]
pub struct HookRef(Arc<dyn Hook>);

impl HookRef {
    /// Wraps a hook.
    pub fn new<H: Hook>(hook: H) -> Self {
        Self(Arc::new(hook))
    }

    /// Wraps a closure.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&Event, &Payload) -> R + Send + Sync + 'static,
        R: IntoHookResult + 'static,
    {
        Self::new(FnHook {
            f,
            _result: PhantomData,
        })
    }

    /// Wraps an already shared hook.
    pub fn from_arc(hook: Arc<dyn Hook>) -> Self {
        Self(hook)
    }

    /// Invokes the hook.
    pub fn call(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        self.0.on_event(event, payload)
    }

    /// Whether both refs point at the same hook.
    pub fn ptr_eq(&self, other: &HookRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for HookRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HookRef {}

impl fmt::Debug for HookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookRef")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

impl Hook for HookRef {
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        self.call(event, payload)
    }
}
