//! # ramify-std
//!
//! Standard implementations for the Ramify hierarchical event framework.
//!
//! This crate provides:
//! - **Evented objects**: [`Evented`] and the [`EventSpawner`],
//!   [`EventSource`] and [`EventTarget`] capability traits
//! - **Standard hooks**: Logging, Conditional, Branch
//! - **Testing utilities**: Recording, Counting, Stop and Failing hooks

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use ramify_core;

// Modules
pub mod evented;
pub mod hooks;
pub mod testing;

pub use evented::{EventSource, EventSpawner, EventTarget, Evented};
