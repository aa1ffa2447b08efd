//! Port for structured conversation logging.
//!
//! [`ConversationLogger`] records what was sent to and received from the
//! collaborators (generated plans, step outcomes, narratives) as
//! machine-readable events. Diagnostic messages go through `tracing`.

use serde_json::Value;

/// One structured event: a type tag plus event-specific JSON fields
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// e.g. "plan_generated", "step_completed", "report_synthesized"
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible; a sink that cannot write drops the
/// event.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Disabled logging
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
