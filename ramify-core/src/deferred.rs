//! Completion tokens for hooks whose work outlives the dispatch pass.
//!
//! Dispatch never waits. A hook that starts asynchronous work returns
//! [`HookResult::Deferred`](crate::HookResult::Deferred); the event space keeps
//! the event on the event stack until the token settles, so causal lookups
//! made by that work still see the right originating event.
//!
//! ```rust,ignore
//! let (deferred, work) = Deferred::track(async move {
//!     store.save(record).await
//! });
//! tokio::spawn(work);
//! Ok(HookResult::Deferred(deferred))
//! ```

use futures::{
    FutureExt,
    channel::oneshot,
    future::{BoxFuture, Future},
};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

type Callback = Box<dyn FnOnce() + Send + 'static>;

enum State {
    Pending(Vec<Callback>),
    Settled,
}

fn settle(state: &Mutex<State>) {
    let callbacks = match std::mem::replace(&mut *state.lock(), State::Settled) {
        State::Pending(callbacks) => callbacks,
        State::Settled => Vec::new(),
    };
    for callback in callbacks {
        callback();
    }
}

/// A shareable token that settles exactly once.
///
/// Runtime-agnostic: settling is driven by a [`Settle`] guard or by a future
/// wrapped with [`Deferred::track`].
#[derive(Clone)]
pub struct Deferred {
    state: Arc<Mutex<State>>,
}

impl Deferred {
    /// Creates a pending token and the guard that settles it.
    pub fn new() -> (Self, Settle) {
        let state = Arc::new(Mutex::new(State::Pending(Vec::new())));
        (
            Self {
                state: state.clone(),
            },
            Settle { state: Some(state) },
        )
    }

    /// A token that is already settled.
    pub fn settled() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Settled)),
        }
    }

    /// Wraps a future so the returned token settles when it completes or is
    /// dropped unfinished.
    ///
    /// The caller drives the returned future, typically by spawning it.
    pub fn track<F>(future: F) -> (Self, BoxFuture<'static, F::Output>)
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (deferred, settle) = Self::new();
        let work = async move {
            let _settle = settle;
            future.await
        }
        .boxed();
        (deferred, work)
    }

    /// Whether the token has settled.
    pub fn is_settled(&self) -> bool {
        matches!(*self.state.lock(), State::Settled)
    }

    /// Runs `callback` once the token settles, or right away if it already has.
    pub fn on_settled<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if let State::Pending(callbacks) = &mut *state {
                callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// A future that completes once the token settles.
    pub fn wait(&self) -> BoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        self.on_settled(move || {
            let _ = tx.send(());
        });
        async move {
            let _ = rx.await;
        }
        .boxed()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Guard that settles its [`Deferred`] on [`resolve`](Settle::resolve) or drop.
pub struct Settle {
    state: Option<Arc<Mutex<State>>>,
}

impl Settle {
    /// Settles the token now.
    pub fn resolve(mut self) {
        if let Some(state) = self.state.take() {
            settle(&state);
        }
    }
}

impl Drop for Settle {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            settle(&state);
        }
    }
}

impl fmt::Debug for Settle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle").finish_non_exhaustive()
    }
}
