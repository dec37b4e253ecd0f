//! # Session Manager
//!
//! Owns the session token for the lifetime of the process and is the only
//! component allowed to change it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  Process start                                                         │
//! │  └── SessionHandle::restore(store) ── token? ──► Authenticated         │
//! │                                      none   ──► Unauthenticated        │
//! │                                                                         │
//! │  login(user, pass)                                                     │
//! │  ├── 1. Authenticator::authenticate          (no state touched yet)    │
//! │  ├── 2. CredentialStore::save(token)         (failure aborts login)    │
//! │  ├── 3. SessionHandle ◄── token, epoch + 1   (watchers see Authenticated)│
//! │  └── 4. navigate(Dashboard)                                            │
//! │                                                                         │
//! │  logout() / force_logout()                                             │
//! │  ├── 1. SessionHandle ◄── anonymous, epoch + 1                         │
//! │  ├── 2. SessionListener::session_ended()     (views drop cached data)  │
//! │  ├── 3. CredentialStore::clear()                                       │
//! │  └── 4. navigate(Login)  [+ "session expired" on force_logout]         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shared State
//! [`SessionHandle`] is cloned into every collaborator that needs the token
//! (the HTTP client reads it when building each request). Only
//! [`SessionManager`] writes to it.
//!
//! The epoch counter increases on every login and logout, so work started
//! under one session can tell that the session changed while it was running.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use railtrack_core::{AuthEvent, AuthState, Route, Session};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::Authenticator;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};
use crate::events::{ClientEventEmitter, NoOpEmitter, Notification};

// =============================================================================
// Session Handle
// =============================================================================

#[derive(Debug, Default)]
struct SessionSlot {
    session: Session,
    epoch: u64,
}

/// Shared, read-mostly view of the current session.
#[derive(Clone)]
pub struct SessionHandle {
    slot: Arc<RwLock<SessionSlot>>,
    state_tx: Arc<watch::Sender<AuthState>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        let (state_tx, _) = watch::channel(session.state());
        SessionHandle {
            slot: Arc::new(RwLock::new(SessionSlot { session, epoch: 0 })),
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Session::anonymous())
    }

    /// Builds the start-up session from whatever the store holds.
    ///
    /// An unreadable store starts the process logged out.
    pub fn restore(store: &dyn CredentialStore) -> Self {
        match store.load() {
            Ok(token) => {
                let session = Session::new(token);
                info!(authenticated = session.is_authenticated(), "Session restored");
                Self::new(session)
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored credentials, starting logged out");
                Self::anonymous()
            }
        }
    }

    pub fn session(&self) -> Session {
        self.read(|slot| slot.session.clone())
    }

    /// Session and epoch read together.
    pub fn snapshot(&self) -> (Session, u64) {
        self.read(|slot| (slot.session.clone(), slot.epoch))
    }

    pub fn token(&self) -> Option<String> {
        self.read(|slot| slot.session.token().map(str::to_string))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|slot| slot.session.is_authenticated())
    }

    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    pub fn epoch(&self) -> u64 {
        self.read(|slot| slot.epoch)
    }

    /// Watches the auth state. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&SessionSlot) -> T) -> T {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f(&slot)
    }

    /// Applies an auth event. Returns the new epoch.
    fn apply(&self, event: AuthEvent, token: Option<String>) -> u64 {
        let (state, epoch) = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            let state = slot.session.state().transition(event);
            slot.session = match state {
                AuthState::Authenticated => Session::new(token),
                AuthState::Unauthenticated => Session::anonymous(),
            };
            slot.epoch += 1;
            (slot.session.state(), slot.epoch)
        };

        self.state_tx.send_replace(state);
        debug!(?event, ?state, epoch, "Session changed");
        epoch
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (session, epoch) = self.snapshot();
        f.debug_struct("SessionHandle")
            .field("session", &session)
            .field("epoch", &epoch)
            .finish()
    }
}

// =============================================================================
// Session Manager
// =============================================================================

/// Told when the session ends, before navigation to the login view.
pub trait SessionListener: Send + Sync {
    fn session_ended(&self);
}

/// Single writer of the session.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    authenticator: Arc<dyn Authenticator>,
    session: SessionHandle,
    emitter: Arc<dyn ClientEventEmitter>,
    listeners: RwLock<Vec<Weak<dyn SessionListener>>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        authenticator: Arc<dyn Authenticator>,
        session: SessionHandle,
    ) -> Self {
        SessionManager {
            store,
            authenticator,
            session,
            emitter: Arc::new(NoOpEmitter),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn ClientEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Registers a listener for session end. Dropped listeners are pruned.
    pub fn add_listener(&self, listener: Weak<dyn SessionListener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|l| l.strong_count() > 0);
        listeners.push(listener);
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn current_token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session.subscribe()
    }

    /// Exchanges credentials for a token and persists it.
    ///
    /// On any failure the session is left exactly as it was and the user is
    /// notified once. There is no retry.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let token = match self.authenticator.authenticate(username, password).await {
            Ok(token) if !token.is_empty() => token,
            Ok(_) => {
                return Err(self.login_failed(ClientError::Auth("empty token".into())));
            }
            Err(e) => return Err(self.login_failed(e)),
        };

        if let Err(e) = self.store.save(&token) {
            return Err(self.login_failed(e));
        }

        let epoch = self.session.apply(AuthEvent::LoginSucceeded, Some(token));
        info!(username, epoch, "Logged in");

        self.emitter.navigate(&Route::Dashboard);
        Ok(())
    }

    fn login_failed(&self, err: ClientError) -> ClientError {
        warn!(error = %err, "Login failed");
        self.emitter.notify(&Notification::error(err.user_message()));
        err
    }

    /// Ends the session and returns to the login view.
    ///
    /// The in-memory session is always cleared; a failure to clear the
    /// credential file is reported afterwards.
    pub fn logout(&self) -> ClientResult<()> {
        self.end_session(AuthEvent::LoggedOut)
    }

    /// Ends the session after the server rejected the token.
    ///
    /// Returns false when there was no session to end, so a burst of 401s
    /// produces one notification.
    pub fn force_logout(&self) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }

        if let Err(e) = self.end_session(AuthEvent::Unauthorized) {
            warn!(error = %e, "Stale token could not be removed from storage");
        }
        self.emitter.notify(&Notification::error(
            ClientError::Unauthorized.user_message(),
        ));
        true
    }

    fn end_session(&self, event: AuthEvent) -> ClientResult<()> {
        let epoch = self.session.apply(event, None);
        info!(?event, epoch, "Logged out");

        let listeners: Vec<_> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|l| l.upgrade())
            .collect();
        for listener in listeners {
            listener.session_ended();
        }

        let cleared = self.store.clear();
        self.emitter.navigate(&Route::Login);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeAuthenticator;
    use crate::credentials::{FileCredentialStore, MemoryCredentialStore};
    use crate::events::RecordingEmitter;
    use railtrack_core::AccessGuard;

    struct FailingStore;

    impl CredentialStore for FailingStore {
        fn load(&self) -> ClientResult<Option<String>> {
            Err(ClientError::Storage("disk unavailable".into()))
        }
        fn save(&self, _token: &str) -> ClientResult<()> {
            Err(ClientError::Storage("disk full".into()))
        }
        fn clear(&self) -> ClientResult<()> {
            Err(ClientError::Storage("read-only".into()))
        }
    }

    fn manager(
        store: Arc<dyn CredentialStore>,
    ) -> (SessionManager, Arc<RecordingEmitter>) {
        let emitter = Arc::new(RecordingEmitter::default());
        let session = SessionHandle::restore(store.as_ref());
        let manager = SessionManager::new(store, Arc::new(FakeAuthenticator::new("tok-1")), session)
            .with_emitter(emitter.clone());
        (manager, emitter)
    }

    #[tokio::test]
    async fn test_login_stores_token_and_navigates_home() {
        let store = Arc::new(MemoryCredentialStore::new());
        let (manager, emitter) = manager(store.clone());
        let mut states = manager.subscribe();
        assert_eq!(*states.borrow(), AuthState::Unauthenticated);

        manager.login("admin", "secret").await.unwrap();

        assert_eq!(manager.current_token().as_deref(), Some("tok-1"));
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));
        assert!(AccessGuard::can_enter(&manager.session().session()));
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), AuthState::Authenticated);
        assert_eq!(emitter.routes(), vec![Route::Dashboard]);
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_untouched() {
        let store = Arc::new(MemoryCredentialStore::new());
        let (manager, emitter) = manager(store.clone());

        let err = manager.login("admin", "wrong").await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(_)));
        assert_eq!(manager.current_token(), None);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(manager.session().epoch(), 0);
        assert!(emitter.routes().is_empty());
        assert_eq!(
            emitter.notifications(),
            vec![Notification::error("Login failed: Invalid username or password.")]
        );
    }

    #[tokio::test]
    async fn test_store_failure_aborts_login() {
        let (manager, emitter) = manager(Arc::new(FailingStore));

        let err = manager.login("admin", "secret").await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        assert!(!manager.is_authenticated());
        assert!(emitter.routes().is_empty());
        assert_eq!(emitter.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = Arc::new(MemoryCredentialStore::with_token("tok-0"));
        let (manager, emitter) = manager(store.clone());
        assert!(manager.is_authenticated());

        manager.logout().unwrap();

        assert_eq!(manager.current_token(), None);
        assert_eq!(store.load().unwrap(), None);
        assert!(!AccessGuard::can_enter(&manager.session().session()));
        assert_eq!(emitter.routes(), vec![Route::Login]);

        // idempotent apart from navigation
        manager.logout().unwrap();
        assert_eq!(manager.current_token(), None);
        assert_eq!(emitter.routes(), vec![Route::Login, Route::Login]);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_even_if_store_fails() {
        let emitter = Arc::new(RecordingEmitter::default());
        let manager = SessionManager::new(
            Arc::new(FailingStore),
            Arc::new(FakeAuthenticator::new("tok-1")),
            SessionHandle::new(Session::new(Some("tok-0".into()))),
        )
        .with_emitter(emitter.clone());

        assert!(manager.logout().is_err());
        assert!(!manager.is_authenticated());
        assert_eq!(emitter.routes(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_force_logout_notifies_once() {
        let store = Arc::new(MemoryCredentialStore::with_token("stale"));
        let (manager, emitter) = manager(store.clone());

        assert!(manager.force_logout());
        assert!(!manager.force_logout());

        assert_eq!(manager.current_token(), None);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(emitter.routes(), vec![Route::Login]);
        assert_eq!(emitter.notifications().len(), 1);
        assert_eq!(manager.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_then_rejected_token_clears_session() {
        let store = Arc::new(MemoryCredentialStore::new());
        let (manager, emitter) = manager(store.clone());

        manager.login("admin", "secret").await.unwrap();
        assert!(AccessGuard::can_enter(&manager.session().session()));

        assert!(manager.force_logout());

        assert_eq!(manager.current_token(), None);
        assert_eq!(store.load().unwrap(), None);
        assert!(!AccessGuard::can_enter(&manager.session().session()));
        assert_eq!(emitter.routes(), vec![Route::Dashboard, Route::Login]);
        assert_eq!(
            emitter.notifications(),
            vec![Notification::error(ClientError::Unauthorized.user_message())]
        );
    }

    #[derive(Default)]
    struct CountingListener(std::sync::atomic::AtomicUsize);

    impl SessionListener for CountingListener {
        fn session_ended(&self) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_listeners_told_on_logout_and_forced_logout() {
        let (manager, _) = manager(Arc::new(MemoryCredentialStore::new()));
        let listener = Arc::new(CountingListener::default());
        let as_dyn: Arc<dyn SessionListener> = listener.clone();
        manager.add_listener(Arc::downgrade(&as_dyn));

        manager.login("admin", "secret").await.unwrap();
        assert_eq!(listener.0.load(std::sync::atomic::Ordering::SeqCst), 0);

        manager.logout().unwrap();
        manager.login("admin", "secret").await.unwrap();
        manager.force_logout();
        assert_eq!(listener.0.load(std::sync::atomic::Ordering::SeqCst), 2);

        drop(as_dyn);
        drop(listener);
        manager.login("admin", "secret").await.unwrap();
        manager.logout().unwrap();
    }

    #[tokio::test]
    async fn test_epoch_increments_on_every_change() {
        let (manager, _) = manager(Arc::new(MemoryCredentialStore::new()));
        let session = manager.session().clone();
        assert_eq!(session.epoch(), 0);

        manager.login("admin", "secret").await.unwrap();
        assert_eq!(session.epoch(), 1);

        manager.logout().unwrap();
        assert_eq!(session.epoch(), 2);

        let _ = manager.login("admin", "nope").await;
        assert_eq!(session.epoch(), 2);
    }

    #[test]
    fn test_restore_from_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        assert!(!SessionHandle::restore(&store).is_authenticated());

        store.save("persisted").unwrap();
        let restored = SessionHandle::restore(&store);
        assert!(restored.is_authenticated());
        assert_eq!(restored.token().as_deref(), Some("persisted"));
        assert_eq!(restored.state(), AuthState::Authenticated);
    }

    #[test]
    fn test_unreadable_store_starts_logged_out() {
        let handle = SessionHandle::restore(&FailingStore);
        assert!(!handle.is_authenticated());
    }

    #[test]
    fn test_handle_debug_hides_token() {
        let handle = SessionHandle::new(Session::new(Some("very-secret".into())));
        assert!(!format!("{:?}", handle).contains("very-secret"));
    }
}
