//! # ramify - Hierarchical Event Dispatch
//!
//! `ramify` dispatches named events through a tree of `>`-delimited paths.
//! Hooks subscribe to an event name at a path inside an [`EventSpace`]; an
//! event either **bubbles** from its target toward the top-level segment or
//! is **broadcast** to every subscribed path below a root.
//!
//! ## Quick Start
//!
//! ```rust
//! use ramify::prelude::*;
//!
//! let space = EventSpace::isolated();
//! let doc: EventPath = "doc".parse().unwrap();
//!
//! space
//!     .subscribe_to("save", doc, HookRef::from_fn(|event: &Event, _: &Payload| {
//!         // Runs while the event bubbles past `doc`.
//!         assert_eq!(event.current_path().unwrap().to_string(), "doc");
//!     }))
//!     .unwrap();
//!
//! let target: EventPath = "doc>42".parse().unwrap();
//! let result = space.spawn_event("save").unwrap().trigger_sync_at(target).unwrap();
//! assert_eq!(result.executed_count, 1);
//! ```
//!
//! ## Evented objects
//!
//! Types that own an [`Evented`] get a location of their own: they spawn
//! events targeted at it and subscribe hooks there.
//!
//! ```rust,ignore
//! use ramify::prelude::*;
//!
//! let doc = Evented::new(EventSpace::isolated(), "doc>42".parse()?);
//! doc.subscribe_to("save", HookRef::from_fn(|_: &Event, _: &Payload| {}))?;
//! doc.trigger_sync("save")?;
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): dispatch, subscription and hook failures are
//!   reported through `tracing`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use ramify_core::{
    // Errors
    BoxError,
    // Events
    BroadcastOrder,
    CHOICE_SEPARATOR,
    CallResult,
    // Chain
    ChainError,
    ChainIter,
    Deferred,
    DispatchError,
    Event,
    EventError,
    EventKind,
    // Paths
    EventPath,
    EventSpace,
    EventSpaceBuilder,
    EventStack,
    // Hooks
    FnHook,
    Hook,
    HookRef,
    HookResult,
    IntoHookResult,
    LinkId,
    Map,
    OpenChain,
    Path,
    PathError,
    // Payload
    Payload,
    PayloadStore,
    Query,
    QuerySegment,
    RamifyError,
    SEPARATOR,
    SKIP,
    Sender,
    Settle,
    SpaceConfig,
    StackEntry,
    Value,
    WILDCARD,
    delete_next_payload_item,
    delete_next_payload_items,
    set_next_payload_item,
    set_next_payload_items,
};

pub use ramify_std::{EventSource, EventSpawner, EventTarget, Evented};

/// Evented objects and their capability traits.
pub mod evented {
    #![allow(clippy::wildcard_imports)]
    pub use ramify_std::evented::*;
}

/// Standard hook implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use ramify_std::hooks::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use ramify_std::testing::*;
}

/// Prelude module - common imports for Ramify.
///
/// # Usage
///
/// ```rust,ignore
/// use ramify::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Dispatch
        CallResult,
        Deferred,
        DispatchError,
        Event,
        EventError,
        EventPath,
        // Evented objects
        EventSource,
        EventSpace,
        EventSpawner,
        EventTarget,
        Evented,
        // Hooks
        Hook,
        HookRef,
        HookResult,
        Path,
        Payload,
        Query,
    };
}
