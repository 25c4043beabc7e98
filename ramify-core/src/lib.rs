//! # ramify-core
//!
//! Core dispatch primitives for the Ramify hierarchical event framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and extensions that don't need the hooks and helpers of
//! `ramify-std`.
//!
//! # Model
//!
//! Events are named messages addressed to `>`-delimited paths inside an
//! [`EventSpace`]. Hooks subscribe to an event name at a path.
//!
//! - **Triggering** an event targeted at `app>users>42` runs the hooks at
//!   `app>users>42`, then `app>users`, then `app`. Any hook can stop the
//!   propagation.
//! - **Broadcasting** from `app` runs the hooks at every subscribed path under
//!   `app`, each branch independently.
//! - **Queries** such as `app>|>42` or `app>\>42` address patterns; they are
//!   dispatched once and never bubble.
//!
//! While a hook runs, its event sits on an [`EventStack`]. Events spawned in
//! the meantime record it as their [original event](Event::original_event),
//! which forms a causal chain that hooks can walk.
//!
//! ```rust
//! use ramify_core::{Event, EventPath, EventSpace, HookRef, Payload};
//!
//! let space = EventSpace::isolated();
//! let app: EventPath = "app".parse().unwrap();
//! space
//!     .subscribe_to("save", app, HookRef::from_fn(|event: &Event, _: &Payload| {
//!         assert_eq!(event.original_path().unwrap().to_string(), "app>users>42");
//!     }))
//!     .unwrap();
//!
//! let target: EventPath = "app>users>42".parse().unwrap();
//! let result = space.spawn_event("save").unwrap().trigger_sync_at(target).unwrap();
//! assert_eq!(result.executed_count, 1);
//! ```
//!
//! # Error Types
//!
//! - [`RamifyError`] - Top-level error type
//! - [`PathError`] - Malformed paths and queries
//! - [`EventError`] - Invalid arguments
//! - [`DispatchError`] - Hook failures during dispatch
//! - [`ChainError`] - Chain link misuse

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod chain;
mod deferred;
mod error;
mod event;
mod event_path;
mod hook;
mod path;
mod payload;
mod query;
mod registry;
mod space;
mod stack;

// Re-exports
pub use chain::{ChainIter, LinkId, OpenChain};
pub use deferred::{Deferred, Settle};
pub use error::{BoxError, ChainError, DispatchError, EventError, PathError, RamifyError};
pub use event::{Event, EventKind, Sender};
pub use event_path::EventPath;
pub use hook::{FnHook, Hook, HookRef, HookResult, IntoHookResult};
pub use path::{Path, SEPARATOR};
pub use payload::{
    Payload, PayloadStore, delete_next_payload_item, delete_next_payload_items,
    set_next_payload_item, set_next_payload_items,
};
pub use query::{CHOICE_SEPARATOR, Query, QuerySegment, SKIP, WILDCARD};
pub use serde_json::{Map, Value};
pub use space::{BroadcastOrder, CallResult, EventSpace, EventSpaceBuilder, SpaceConfig};
pub use stack::{EventStack, StackEntry};
