//! Session store port
//!
//! Conversation history keyed by session id. The engine reads history before
//! planning and appends the goal and answer after a run.

use stepwise_domain::{History, Message};

pub trait SessionStore: Send + Sync {
    /// History of `session_id`; empty for an unknown session
    fn get(&self, session_id: &str) -> History;

    fn append(&self, session_id: &str, message: Message);

    fn clear(&self, session_id: &str);
}
