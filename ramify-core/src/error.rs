//! Error types for Ramify.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RamifyError`] - Top-level error type
//! - [`PathError`] - Malformed paths and queries
//! - [`ChainError`] - Misuse of chain links
//! - [`EventError`] - Invalid arguments to events and event spaces
//! - [`DispatchError`] - Failures while hooks run
//!
//! Unsubscribing something that is not subscribed is never an error, and a
//! hook returning [`HookResult::Stop`](crate::HookResult::Stop) is a control
//! signal rather than a failure.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Ramify operations.
#[derive(Error, Debug)]
pub enum RamifyError {
    /// A path or query could not be built or parsed.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A chain link was misused.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// An event or event space received an invalid argument.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Dispatch failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while building or parsing paths and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment was empty.
    #[error("empty segment at position {position}")]
    EmptySegment {
        /// Zero-based index of the offending segment.
        position: usize,
    },

    /// A choice segment had no alternatives.
    #[error("empty choice set at position {position}")]
    EmptyChoice {
        /// Zero-based index of the offending segment.
        position: usize,
    },

    /// A percent-escaped segment did not decode to UTF-8.
    #[error("segment `{0}` is not valid percent-encoded UTF-8")]
    Decode(String),

    /// Pattern segments were found where a concrete path was expected.
    #[error("`{0}` is a query, not a concrete path")]
    NotConcrete(String),
}

/// Errors raised by [`OpenChain`](crate::OpenChain) link manipulation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The link is already part of the chain.
    #[error("attempted to connect an already connected link")]
    AlreadyLinked,

    /// The link id refers to a released or foreign slot.
    #[error("link id is stale or does not belong to this chain")]
    StaleLink,
}

/// Invalid-argument errors. These are programming errors and abort the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Event names must not be empty.
    #[error("invalid event name: event names must not be empty")]
    EmptyEventName,

    /// The delegate path does not lie under the capture path.
    #[error("delegate path `{delegate}` is not relative to capture path `{capture}`")]
    DelegateNotRelative {
        /// Path where the subscription would be captured.
        capture: String,
        /// Path the delegate listens to.
        delegate: String,
    },

    /// A path had to lie under a fixed base path but did not.
    #[error("path `{path}` is not relative to base path `{base}`")]
    PathNotRelative {
        /// The required ancestor.
        base: String,
        /// The rejected path.
        path: String,
    },

    /// The event was triggered without a target path.
    #[error("event `{0}` has no target path")]
    Untargeted(String),
}

/// Errors that can occur during event dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The event could not be dispatched as configured.
    #[error(transparent)]
    Event(#[from] EventError),

    /// A hook failed. Remaining hooks and bubbling levels were skipped.
    #[error("hook for `{event}` at `{path}` failed")]
    Hook {
        /// Name of the event being dispatched.
        event: String,
        /// Textual form of the path the hook was subscribed at.
        path: String,
        /// The error returned by the hook.
        #[source]
        source: BoxError,
    },
}

// Convenience conversions
impl From<BoxError> for RamifyError {
    fn from(err: BoxError) -> Self {
        RamifyError::Custom(err)
    }
}
