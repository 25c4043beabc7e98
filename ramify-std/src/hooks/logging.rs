//! Logging hook for event observation.

use ramify_core::{BoxError, Event, Hook, HookResult, Payload};

/// A hook that logs events for debugging/observation.
///
/// Always lets dispatch continue. Logs at `info` level through `tracing`
/// when the `tracing` feature is enabled and does nothing otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl Hook for LoggingHook {
    fn on_event(&self, event: &Event, payload: &Payload) -> Result<HookResult, BoxError> {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                space = event.space().name(),
                event = event.name(),
                current_path = ?event.current_path().map(|p| p.to_string()),
                original_path = ?event.original_path().map(|p| p.to_string()),
                ?payload,
                "Processing event"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (event, payload); // Suppress unused warning
        }
        Ok(HookResult::Next)
    }
}
