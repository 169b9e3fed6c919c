//! Access decisions for protected views.

use std::sync::Arc;

use super::store::{SessionState, SessionStore};

/// What to do with a navigation to a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The store has not finished its restore attempt; show a neutral
    /// waiting state and decide nothing yet.
    Wait,
    /// No session; send the user to the login entry point. The attempted
    /// destination is discarded.
    RedirectToLogin,
    /// Authenticated; render the requested view.
    Render,
}

/// Gates protected views on the session store's state.
///
/// `decide` reads the store fresh on every call - decisions are never
/// cached, so it must be consulted on each navigation. The guard can also
/// be wired up as a store listener to re-check when the session changes.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn decide(&self) -> RouteDecision {
        match self.session.state() {
            SessionState::Uninitialized => RouteDecision::Wait,
            SessionState::Anonymous => RouteDecision::RedirectToLogin,
            SessionState::Authenticated => RouteDecision::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::User;
    use crate::session::storage::testing::MemoryStorage;
    use crate::session::storage::PersistedSession;

    use super::*;

    fn guard_with_storage(storage: MemoryStorage) -> (RouteGuard, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(Box::new(storage)));
        (RouteGuard::new(store.clone()), store)
    }

    fn persisted() -> PersistedSession {
        PersistedSession {
            token: "T1".to_string(),
            user: User {
                id: "u-1".to_string(),
                email: "a@b.com".to_string(),
                name: "A".to_string(),
                created_at: None,
            },
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_waits_until_ready() {
        let (guard, store) = guard_with_storage(MemoryStorage::default());
        assert_eq!(guard.decide(), RouteDecision::Wait);

        store.initialize();
        assert_eq!(guard.decide(), RouteDecision::RedirectToLogin);
    }

    #[test]
    fn test_renders_for_restored_session() {
        let (guard, store) = guard_with_storage(MemoryStorage::with_session(persisted()));
        store.initialize();
        assert_eq!(guard.decide(), RouteDecision::Render);
    }

    #[test]
    fn test_decision_tracks_every_transition() {
        let (guard, store) = guard_with_storage(MemoryStorage::default());
        store.initialize();
        assert_eq!(guard.decide(), RouteDecision::RedirectToLogin);

        store.install("T1".to_string(), persisted().user);
        assert_eq!(guard.decide(), RouteDecision::Render);

        store.logout();
        assert_eq!(guard.decide(), RouteDecision::RedirectToLogin);
    }
}
