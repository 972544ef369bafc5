//! In-memory store of model sessions.
//!
//! Keeps every session in a map keyed by [`SessionKey`]. Intended for tests,
//! development, and embedding scenarios where persistence across restarts is
//! not required; a real deployment would put the authoritative log behind a
//! durable store.

use crate::delta::{Delta, ModelIdGen};
use crate::server::session::ModelSession;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque key identifying one model session in a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(pub String);

impl SessionKey {
    /// Create a new unique session key.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a session key from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory map of model sessions.
pub struct MemoryStore<M, D> {
    /// Sessions keyed by their session key
    sessions: HashMap<SessionKey, ModelSession<M, D>>,
}

impl<M, D> MemoryStore<M, D>
where
    M: Clone + 'static,
    D: Delta<M> + Clone,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Start a new session from an initial model and return its key.
    pub fn create_session(&mut self, model: M, id_gen: &impl ModelIdGen<M>) -> SessionKey {
        let key = SessionKey::new();
        self.sessions.insert(key.clone(), ModelSession::new(model, id_gen));
        key
    }

    /// Get a session by key.
    pub fn get(&self, key: &SessionKey) -> Option<&ModelSession<M, D>> {
        self.sessions.get(key)
    }

    /// Get a session by key for mutation.
    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut ModelSession<M, D>> {
        self.sessions.get_mut(key)
    }

    /// Remove a session, returning it if present.
    pub fn remove(&mut self, key: &SessionKey) -> Option<ModelSession<M, D>> {
        self.sessions.remove(key)
    }

    /// Check whether a session exists.
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Number of sessions in the store.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Keys of every session in the store.
    pub fn session_keys(&self) -> Vec<SessionKey> {
        self.sessions.keys().cloned().collect()
    }
}

impl<M, D> Default for MemoryStore<M, D>
where
    M: Clone + 'static,
    D: Delta<M> + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeltaIoContext;
    use crate::effect::Effect;
    use crate::id::{ClientDeltaId, ClientId, DeltaId, ModelId};
    use chrono::DateTime;

    #[derive(Clone, Debug)]
    struct Add(i64);

    impl Delta<i64> for Add {
        fn apply(&self, model: i64) -> Effect<i64> {
            Effect::pure(model + self.0)
        }
    }

    fn counter_id(model: &i64) -> ModelId {
        ModelId::new(*model as u64)
    }

    #[test]
    fn test_create_and_get_session() {
        let mut store: MemoryStore<i64, Add> = MemoryStore::new();
        let key = store.create_session(10, &counter_id);

        assert!(store.contains(&key));
        assert_eq!(store.session_count(), 1);
        assert_eq!(store.get(&key).unwrap().model().model, 10);
    }

    #[test]
    fn test_commit_through_store() {
        let mut store: MemoryStore<i64, Add> = MemoryStore::new();
        let key = store.create_session(0, &counter_id);

        let context = DeltaIoContext::new(DateTime::from_timestamp_millis(5).unwrap());
        let delta_id = DeltaId::new(ClientId::new(1), ClientDeltaId::first());
        store
            .get_mut(&key)
            .unwrap()
            .commit(Add(3), delta_id, context, &counter_id);

        assert_eq!(store.get(&key).unwrap().model().model, 3);
    }

    #[test]
    fn test_remove_session() {
        let mut store: MemoryStore<i64, Add> = MemoryStore::new();
        let key = store.create_session(0, &counter_id);
        let missing = SessionKey::new();

        assert!(store.remove(&missing).is_none());
        assert!(store.remove(&key).is_some());
        assert_eq!(store.session_count(), 0);
        assert!(!store.contains(&key));
    }

    #[test]
    fn test_session_keys_are_unique() {
        assert_ne!(SessionKey::new(), SessionKey::new());
        assert_eq!(
            SessionKey::from_string("fixed"),
            SessionKey::from_string("fixed")
        );
    }
}
