//! Process-local session store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use stepwise_application::SessionStore;
use stepwise_domain::{History, Message};
use tracing::warn;

/// [`SessionStore`] keeping every history in memory for the process lifetime
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, History>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one message
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation is a single push or remove, so a poisoned map is
    // still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, History>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            warn!("Session store lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, History>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            warn!("Session store lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> History {
        self.read().get(session_id).cloned().unwrap_or_default()
    }

    fn append(&self, session_id: &str, message: Message) {
        self.write()
            .entry(session_id.to_string())
            .or_default()
            .push(message);
    }

    fn clear(&self, session_id: &str) {
        self.write().remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_session_is_empty() {
        let store = InMemorySessionStore::new();
        assert!(store.get("nope").is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = InMemorySessionStore::new();
        store.append("a", Message::user("plan a trip"));
        store.append("a", Message::assistant("here is your trip"));

        assert_eq!(
            store.get("a"),
            vec![Message::user("plan a trip"), Message::assistant("here is your trip")]
        );
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        store.append("a", Message::user("first"));
        store.append("b", Message::user("second"));

        store.clear("a");

        assert!(store.get("a").is_empty());
        assert_eq!(store.get("b"), vec![Message::user("second")]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_history_survives_poisoned_lock() {
        let store = std::sync::Arc::new(InMemorySessionStore::new());
        store.append("a", Message::user("plan a trip"));

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("writer died");
        })
        .join();
        assert!(store.sessions.is_poisoned());

        store.append("a", Message::assistant("here is your trip"));
        assert_eq!(
            store.get("a"),
            vec![Message::user("plan a trip"), Message::assistant("here is your trip")]
        );
        assert_eq!(store.len(), 1);
    }
}
