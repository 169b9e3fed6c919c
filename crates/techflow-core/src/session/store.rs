//! The session store: single source of truth for "is the user
//! authenticated, and as whom".
//!
//! The store starts `Uninitialized`, runs a one-time restore from its
//! storage backend during `initialize`, and from then on moves between
//! `Anonymous` and `Authenticated` through `login` and `logout` only.
//! Identity and credential are held as a single atom, so no reader can
//! ever observe one without the other. Listeners registered through
//! `subscribe` are invoked synchronously after every committed
//! transition.

use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, warn};

use crate::api::ApiResult;
use crate::models::{LoginRequest, RegisterRequest, RegisterResponse, User};
use crate::services::AuthService;

use super::storage::{PersistedSession, SessionStorage};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The restore attempt has not run yet; no access decision is valid.
    Uninitialized,
    /// Restore has run and there is no session.
    Anonymous,
    /// A user is logged in.
    Authenticated,
}

type Listener = Box<dyn Fn(SessionState) + Send + Sync>;

struct Inner {
    ready: bool,
    /// Identity and credential as one atom; a mismatched pair is
    /// unrepresentable.
    auth: Option<(User, String)>,
}

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    inner: RwLock<Inner>,
    listeners: Mutex<Vec<Listener>>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            inner: RwLock::new(Inner {
                ready: false,
                auth: None,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore any persisted session and mark the store ready.
    ///
    /// Runs at most once; later calls are no-ops. A read or parse failure
    /// is not an error here - it means "no session", and whatever is left
    /// in storage is cleared so the next start is clean.
    pub fn initialize(&self) {
        if self.read().ready {
            return;
        }

        let restored = match self.storage.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to restore persisted session, starting anonymous");
                if let Err(e) = self.storage.clear() {
                    warn!(error = %e, "Failed to clear unreadable persisted session");
                }
                None
            }
        };

        let state = {
            let mut inner = self.write();
            if inner.ready {
                return;
            }
            inner.ready = true;
            inner.auth = restored.map(|s| (s.user, s.token));
            state_of(&inner)
        };
        debug!(?state, "Session store initialized");
        self.notify(state);
    }

    /// Register a listener invoked synchronously after every committed
    /// transition, with the state that was just entered.
    pub fn subscribe(&self, listener: impl Fn(SessionState) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    pub fn state(&self) -> SessionState {
        state_of(&self.read())
    }

    pub fn is_ready(&self) -> bool {
        self.read().ready
    }

    /// The current bearer credential, if authenticated.
    pub fn credential(&self) -> Option<String> {
        self.read().auth.as_ref().map(|(_, token)| token.clone())
    }

    /// The current identity, if authenticated.
    pub fn identity(&self) -> Option<User> {
        self.read().auth.as_ref().map(|(user, _)| user.clone())
    }

    /// Log in through the auth service.
    ///
    /// On success the new identity and credential are installed and
    /// persisted atomically and listeners are notified. On failure the
    /// service error is propagated untouched and the prior session state
    /// is left exactly as it was.
    pub async fn login(&self, auth: &AuthService, request: &LoginRequest) -> ApiResult<User> {
        let response = auth.login(request).await?;
        debug!(user_id = %response.user.id, "Login succeeded");
        self.install(response.token, response.user.clone());
        Ok(response.user)
    }

    /// Register a new account through the auth service.
    ///
    /// Never touches session state: registration does not imply login.
    pub async fn register(
        &self,
        auth: &AuthService,
        request: &RegisterRequest,
    ) -> ApiResult<RegisterResponse> {
        auth.register(request).await
    }

    /// Clear the session locally and remove the persisted copies.
    ///
    /// Always succeeds from the caller's perspective; storage failures
    /// are logged and the in-memory session is cleared regardless.
    pub fn logout(&self) {
        let state = {
            let mut inner = self.write();
            inner.auth = None;
            if let Err(e) = self.storage.clear() {
                warn!(error = %e, "Failed to remove persisted session");
            }
            state_of(&inner)
        };
        debug!("Logged out");
        self.notify(state);
    }

    /// Commit a fresh identity+credential pair and persist it. The write
    /// lock is held across commit and persist so a concurrent transition
    /// cannot slip between the two.
    pub(crate) fn install(&self, token: String, user: User) {
        {
            let mut inner = self.write();
            inner.auth = Some((user.clone(), token.clone()));
            let snapshot = PersistedSession {
                token,
                user,
                saved_at: Utc::now(),
            };
            if let Err(e) = self.storage.store(&snapshot) {
                warn!(error = %e, "Failed to persist session, continuing in-memory");
            }
        }
        self.notify(SessionState::Authenticated);
    }

    fn notify(&self, state: SessionState) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(state);
        }
    }
}

fn state_of(inner: &Inner) -> SessionState {
    if !inner.ready {
        SessionState::Uninitialized
    } else if inner.auth.is_some() {
        SessionState::Authenticated
    } else {
        SessionState::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::storage::testing::MemoryStorage;
    use super::*;

    fn sample_user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: format!("User {}", id),
            created_at: None,
        }
    }

    fn persisted(id: &str, token: &str) -> PersistedSession {
        PersistedSession {
            token: token.to_string(),
            user: sample_user(id),
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_starts_uninitialized() {
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        assert_eq!(store.state(), SessionState::Uninitialized);
        assert!(!store.is_ready());
        assert!(store.credential().is_none());
        assert!(store.identity().is_none());
    }

    #[test]
    fn test_initialize_without_persisted_session() {
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        store.initialize();
        assert!(store.is_ready());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_initialize_restores_persisted_session() {
        let storage = MemoryStorage::with_session(persisted("u-1", "T-restored"));
        let store = SessionStore::new(Box::new(storage));
        store.initialize();
        assert_eq!(store.state(), SessionState::Authenticated);
        assert_eq!(store.credential().as_deref(), Some("T-restored"));
        assert_eq!(store.identity().map(|u| u.id), Some("u-1".to_string()));
    }

    #[test]
    fn test_initialize_with_corrupted_storage_is_anonymous() {
        let store = SessionStore::new(Box::new(MemoryStorage::corrupted()));
        store.initialize();
        assert!(store.is_ready());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_initialize_is_one_shot() {
        let notified = Arc::new(Mutex::new(Vec::new()));
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        let sink = notified.clone();
        store.subscribe(move |state| sink.lock().unwrap().push(state));

        store.initialize();
        store.initialize();
        store.initialize();

        assert_eq!(notified.lock().unwrap().as_slice(), &[SessionState::Anonymous]);
    }

    #[test]
    fn test_install_commits_identity_and_credential_together() {
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        store.initialize();

        store.install("T1".to_string(), sample_user("1"));
        assert_eq!(store.state(), SessionState::Authenticated);
        assert_eq!(store.credential().as_deref(), Some("T1"));
        assert_eq!(store.identity().map(|u| u.id), Some("1".to_string()));
    }

    #[test]
    fn test_relogin_replaces_identity() {
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        store.initialize();

        store.install("T1".to_string(), sample_user("1"));
        store.install("T2".to_string(), sample_user("2"));

        assert_eq!(store.state(), SessionState::Authenticated);
        assert_eq!(store.credential().as_deref(), Some("T2"));
        assert_eq!(store.identity().map(|u| u.id), Some("2".to_string()));
    }

    #[test]
    fn test_logout_clears_everything() {
        let storage = Arc::new(MemoryStorage::default());
        // Wrap the shared storage so we can inspect it after logout
        struct Shared(Arc<MemoryStorage>);
        impl SessionStorage for Shared {
            fn load(&self) -> anyhow::Result<Option<PersistedSession>> {
                self.0.load()
            }
            fn store(&self, session: &PersistedSession) -> anyhow::Result<()> {
                self.0.store(session)
            }
            fn clear(&self) -> anyhow::Result<()> {
                self.0.clear()
            }
        }

        let store = SessionStore::new(Box::new(Shared(storage.clone())));
        store.initialize();
        store.install("T1".to_string(), sample_user("1"));
        assert!(storage.slot.lock().unwrap().is_some());

        store.logout();
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(store.credential().is_none());
        assert!(store.identity().is_none());
        assert!(storage.slot.lock().unwrap().is_none());
    }

    #[test]
    fn test_identity_and_credential_never_mismatch() {
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        store.initialize();

        // Interleave transitions and check the pairing invariant after each
        let check = |store: &SessionStore| {
            assert_eq!(store.credential().is_some(), store.identity().is_some());
        };

        check(&store);
        store.install("T1".to_string(), sample_user("1"));
        check(&store);
        store.logout();
        check(&store);
        store.logout();
        check(&store);
        store.install("T2".to_string(), sample_user("2"));
        check(&store);
    }

    #[test]
    fn test_listeners_fire_in_commit_order() {
        let notified = Arc::new(Mutex::new(Vec::new()));
        let store = SessionStore::new(Box::<MemoryStorage>::default());
        let sink = notified.clone();
        store.subscribe(move |state| sink.lock().unwrap().push(state));

        store.initialize();
        store.install("T1".to_string(), sample_user("1"));
        store.logout();

        assert_eq!(
            notified.lock().unwrap().as_slice(),
            &[
                SessionState::Anonymous,
                SessionState::Authenticated,
                SessionState::Anonymous,
            ]
        );
    }

    #[test]
    fn test_persist_failure_does_not_block_login() {
        // Storage that accepts nothing at all
        struct RejectingStorage;
        impl SessionStorage for RejectingStorage {
            fn load(&self) -> anyhow::Result<Option<PersistedSession>> {
                Ok(None)
            }
            fn store(&self, _: &PersistedSession) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
            fn clear(&self) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
        }

        let store = SessionStore::new(Box::new(RejectingStorage));
        store.initialize();

        store.install("T1".to_string(), sample_user("1"));
        assert_eq!(store.state(), SessionState::Authenticated);

        // Logout still succeeds locally even though clear() fails
        store.logout();
        assert_eq!(store.state(), SessionState::Anonymous);
    }
}
