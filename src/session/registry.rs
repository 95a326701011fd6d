//! Concurrency-safe session registry — id → session, create/get/remove.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::session::{Session, SessionId};

/// In-memory registry of live sessions.
///
/// The only structure shared across request tasks. The lock is held for
/// the duration of the map operation itself and never across tool
/// invocation. State is lost on restart by design — sessions are
/// connection-scoped, not a durability boundary.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh id and store a new session in `Initializing`
    /// state. The caller marks it Active once the id is about to be
    /// surfaced to the client.
    pub async fn create(&self) -> (SessionId, Arc<Session>) {
        let id = SessionId::generate();
        let session = Arc::new(Session::new(id.clone()));
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        tracing::info!(session = %id, "session created");
        (id, session)
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session. Returns whether it existed. Ids are never
    /// reused: a removed id can only be replaced by a freshly generated
    /// one.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session removed");
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Close and drop every session. Used on administrative shutdown.
    pub async fn close_all(&self) {
        let drained: Vec<Arc<Session>> = self.sessions.write().await.drain().map(|(_, s)| s).collect();
        for session in drained {
            session.close().await;
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    #[tokio::test]
    async fn create_get_remove_roundtrip() {
        let registry = SessionRegistry::new();
        let (id, session) = registry.create().await;
        assert_eq!(session.state().await, SessionState::Initializing);
        assert!(registry.get(&id).await.is_some());
        assert!(registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
        assert!(!registry.remove(&id).await);
    }

    #[tokio::test]
    async fn concurrent_creates_yield_distinct_ids() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let reg = registry.clone();
            handles.push(tokio::spawn(async move { reg.create().await.0 }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 64);
        assert_eq!(registry.count().await, 64);
    }

    #[tokio::test]
    async fn close_all_empties_the_registry() {
        let registry = SessionRegistry::new();
        let (_, s1) = registry.create().await;
        let (_, _s2) = registry.create().await;
        registry.close_all().await;
        assert_eq!(registry.count().await, 0);
        assert_eq!(s1.state().await, SessionState::Closed);
    }
}
