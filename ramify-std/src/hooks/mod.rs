//! Standard hooks.

mod conditional;
mod logging;

pub use conditional::{BranchHook, ConditionalHook};
pub use logging::LoggingHook;
