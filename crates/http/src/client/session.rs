//! Session manager and single-flight refresh coordination
//!
//! Concurrent 401s collapse into one refresh. The first caller to find the
//! manager idle creates a shared refresh future and records it; every caller
//! arriving while it is outstanding awaits a clone of the same future and
//! observes the same outcome. The refresh runs on its own task, raced
//! against a single deadline, so it settles even if every waiter is
//! dropped. When it settles the token store is written first, then the
//! session identity, then the state goes back to idle, and only after that
//! do waiters resume.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use ootd_core::{Session, User};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use super::error::{ClientError, RefreshError};
use super::navigation::Navigator;
use super::token_store::TokenStore;

/// Mints a new session from the out-of-band refresh credential
#[async_trait]
pub trait Refresher: Send + Sync {
    async fn refresh(&self) -> Result<Session, ClientError>;
}

/// Called by the request executor when a first attempt comes back 401
#[async_trait]
pub trait UnauthorizedHandler: Send + Sync {
    /// Resolves once the session has been refreshed or given up on.
    /// `operation` is `"{VERB} {path}"` and only used for diagnostics.
    async fn on_unauthorized(&self, operation: &str);
}

/// Session manager settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deadline for one refresh
    pub refresh_timeout: Duration,
    /// Routes that are themselves authentication entry points
    pub auth_routes: Vec<String>,
    /// Where to send the user when the session is lost
    pub login_route: String,
    /// Where to send the user after signing in
    pub home_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(12),
            auth_routes: vec!["/login".to_string(), "/signup".to_string()],
            login_route: "/login".to_string(),
            home_route: "/closet".to_string(),
        }
    }
}

type SharedRefresh = Shared<BoxFuture<'static, Result<Session, RefreshError>>>;

enum RefreshState {
    Idle,
    Refreshing(SharedRefresh),
}

struct Inner {
    tokens: Arc<TokenStore>,
    identity: ArcSwapOption<Session>,
    refresher: Arc<dyn Refresher>,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
    state: Mutex<RefreshState>,
    refresh_cycles: AtomicU64,
    checked: watch::Sender<bool>,
}

/// Owns the session record and coordinates refreshes
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        tokens: Arc<TokenStore>,
        refresher: Arc<dyn Refresher>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let (checked, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tokens,
                identity: ArcSwapOption::empty(),
                refresher,
                navigator,
                config,
                state: Mutex::new(RefreshState::Idle),
                refresh_cycles: AtomicU64::new(0),
                checked,
            }),
        }
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.inner.tokens
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current session record
    pub fn current_session(&self) -> Option<Session> {
        self.inner.identity.load_full().map(|session| session.as_ref().clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner
            .identity
            .load()
            .as_ref()
            .and_then(|session| session.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.is_authenticated()
    }

    /// Whether a refresh is outstanding right now
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.lock_state(), RefreshState::Refreshing(_))
    }

    /// Number of refresh calls started since construction
    pub fn refresh_cycles(&self) -> u64 {
        self.inner.refresh_cycles.load(Ordering::SeqCst)
    }

    /// Refresh the session, joining the refresh already in flight if there
    /// is one. `trigger` names what asked for it, for diagnostics only.
    pub async fn refresh(&self, trigger: Option<&str>) -> Result<Session, RefreshError> {
        let pending = {
            let mut state = self.inner.lock_state();
            if let RefreshState::Refreshing(pending) = &*state {
                debug!(trigger, "refresh already in flight, waiting");
                pending.clone()
            } else {
                info!(trigger, "starting session refresh");
                self.inner.refresh_cycles.fetch_add(1, Ordering::SeqCst);
                // Runs on its own task so it settles even if every waiter is dropped
                let task = tokio::spawn(Arc::clone(&self.inner).run_refresh());
                let inner = Arc::clone(&self.inner);
                let pending = task
                    .map(move |joined| joined.unwrap_or_else(|err| inner.abandon(&err)))
                    .boxed()
                    .shared();
                *state = RefreshState::Refreshing(pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Restore a session at startup from the refresh cookie alone
    ///
    /// Goes through the same coordinator as 401-triggered refreshes and is
    /// bounded by the same deadline. The session is marked as checked
    /// whatever the outcome.
    pub async fn rehydrate(&self) -> Option<Session> {
        let outcome = self.refresh(Some("rehydrate")).await;
        self.inner.checked.send_replace(true);
        match outcome {
            Ok(session) => Some(session),
            Err(err) => {
                debug!(error = %err, "no session to restore");
                None
            }
        }
    }

    /// Whether startup rehydration has finished
    pub fn has_checked_session(&self) -> bool {
        *self.inner.checked.borrow()
    }

    /// Resolve once startup rehydration has finished
    pub async fn wait_until_checked(&self) {
        let mut checked = self.inner.checked.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = checked.wait_for(|done| *done).await;
    }

    /// Adopt a session obtained by login or signup and go home
    pub fn establish(&self, session: Session) {
        info!(token = %session.access_token.preview(), "session established");
        self.inner.apply(Some(session));
        self.inner.navigator.navigate(&self.inner.config.home_route);
    }

    /// Forget the session locally
    pub fn clear(&self) {
        self.inner.apply(None);
    }

    /// Send the user to the login route
    pub fn redirect_to_login(&self) {
        self.inner.navigator.navigate(&self.inner.config.login_route);
    }
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_refresh(self: Arc<Self>) -> Result<Session, RefreshError> {
        let deadline = self.config.refresh_timeout;
        let outcome = match tokio::time::timeout(deadline, self.refresher.refresh()).await {
            Ok(Ok(session)) => Ok(self.carry_identity(session)),
            Ok(Err(err)) => Err(RefreshError::Rejected(err.to_string())),
            Err(_) => Err(RefreshError::TimedOut(deadline)),
        };

        match &outcome {
            Ok(session) => {
                info!(token = %session.access_token.preview(), "session refreshed");
                self.apply(Some(session.clone()));
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                self.apply(None);
            }
        }

        *self.lock_state() = RefreshState::Idle;

        if outcome.is_err() {
            self.leave_protected_route();
        }

        outcome
    }

    /// The refresh task died before settling
    fn abandon(&self, err: &tokio::task::JoinError) -> Result<Session, RefreshError> {
        error!(error = %err, "session refresh task failed");
        self.apply(None);
        *self.lock_state() = RefreshState::Idle;
        Err(RefreshError::Rejected(format!("refresh task failed: {err}")))
    }

    /// The refresh endpoint may answer with a bare token; keep the known
    /// identity in that case.
    fn carry_identity(&self, mut session: Session) -> Session {
        if session.user.is_none() {
            session.user = self
                .identity
                .load()
                .as_ref()
                .and_then(|previous| previous.user.clone());
        }
        session
    }

    /// Token first, then identity
    fn apply(&self, session: Option<Session>) {
        self.tokens
            .set_token(session.as_ref().map(|session| session.access_token.clone()));
        self.identity.store(session.map(Arc::new));
    }

    fn leave_protected_route(&self) {
        let here = self.navigator.current_location();
        if self.config.auth_routes.iter().any(|route| *route == here) {
            return;
        }
        debug!(from = %here, to = %self.config.login_route, "redirecting to login");
        self.navigator.navigate(&self.config.login_route);
    }
}

#[async_trait]
impl UnauthorizedHandler for SessionManager {
    async fn on_unauthorized(&self, operation: &str) {
        if let Err(err) = self.refresh(Some(operation)).await {
            debug!(operation, error = %err, "retrying without a refreshed session");
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &self.current_session())
            .field("refreshing", &self.is_refreshing())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::navigation::MemoryNavigator;
    use ootd_core::AccessToken;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Refresher whose outcome is released by the test
    struct GatedRefresher {
        calls: AtomicUsize,
        gate: Notify,
        outcome: Mutex<Option<Result<Session, String>>>,
    }

    impl GatedRefresher {
        fn new(outcome: Result<Session, String>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                outcome: Mutex::new(Some(outcome)),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn release(&self) {
            self.gate.notify_one();
        }
    }

    #[async_trait]
    impl Refresher for GatedRefresher {
        async fn refresh(&self) -> Result<Session, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            let outcome = self.outcome.lock().unwrap().clone().unwrap();
            outcome.map_err(ClientError::AuthenticationFailed)
        }
    }

    /// Refresher that answers immediately
    struct InstantRefresher {
        calls: AtomicUsize,
        outcome: Result<Session, String>,
    }

    #[async_trait]
    impl Refresher for InstantRefresher {
        async fn refresh(&self) -> Result<Session, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(ClientError::AuthenticationFailed)
        }
    }

    /// Refresher that waits on the network twice before answering
    struct TwoPhaseRefresher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Refresher for TwoPhaseRefresher {
        async fn refresh(&self) -> Result<Session, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(session("tok2"))
        }
    }

    /// Refresher that never settles
    struct HangingRefresher;

    #[async_trait]
    impl Refresher for HangingRefresher {
        async fn refresh(&self) -> Result<Session, ClientError> {
            futures::future::pending().await
        }
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "mimi@example.com".to_string(),
            username: "mimi".to_string(),
        }
    }

    fn session(token: &str) -> Session {
        Session::new(AccessToken::new(token), Some(user()))
    }

    fn manager(
        refresher: Arc<dyn Refresher>,
        location: &str,
    ) -> (SessionManager, Arc<TokenStore>, Arc<MemoryNavigator>) {
        let tokens = Arc::new(TokenStore::new());
        let navigator = Arc::new(MemoryNavigator::new(location));
        let manager = SessionManager::new(
            Arc::clone(&tokens),
            refresher,
            navigator.clone(),
            SessionConfig::default(),
        );
        (manager, tokens, navigator)
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_call() {
        let refresher = GatedRefresher::new(Ok(session("tok2")));
        let (manager, tokens, _) = manager(refresher.clone(), "/closet");

        let waiters = (0..5).map(|_| manager.refresh(Some("GET /clothes")));
        let all = futures::future::join_all(waiters);
        tokio::pin!(all);

        // let every waiter attach before the refresh settles
        assert!(futures::poll!(&mut all).is_pending());
        assert!(manager.is_refreshing());
        refresher.release();

        let results = all.await;
        assert_eq!(refresher.calls(), 1);
        assert_eq!(manager.refresh_cycles(), 1);
        for result in results {
            assert_eq!(result.unwrap().access_token.as_str(), "tok2");
        }
        assert_eq!(tokens.token(), Some(AccessToken::new("tok2")));
        assert!(!manager.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_settles_after_only_waiter_is_dropped() {
        let refresher = Arc::new(TwoPhaseRefresher {
            calls: AtomicUsize::new(0),
        });
        let (manager, tokens, navigator) = manager(refresher.clone(), "/closet");
        manager.establish(session("tok1"));

        let dropped =
            tokio::time::timeout(Duration::from_millis(10), manager.refresh(Some("GET /clothes")))
                .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!manager.is_refreshing());
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tokens.token(), Some(AccessToken::new("tok2")));
        assert_eq!(navigator.history(), vec!["/closet"]);

        // a later 401 starts a fresh cycle instead of joining a stale one
        let refreshed = manager.refresh(Some("GET /clothes")).await;
        assert_eq!(refreshed.unwrap().access_token.as_str(), "tok2");
        assert_eq!(manager.refresh_cycles(), 2);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(navigator.history(), vec!["/closet"]);
    }

    #[tokio::test]
    async fn test_sequential_refreshes_each_call_backend() {
        let refresher = Arc::new(InstantRefresher {
            calls: AtomicUsize::new(0),
            outcome: Ok(session("tok")),
        });
        let (manager, _, _) = manager(refresher.clone(), "/closet");

        manager.refresh(None).await.unwrap();
        manager.refresh(None).await.unwrap();
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_clears_session_and_redirects_once() {
        let refresher = GatedRefresher::new(Err("Token revoked".to_string()));
        let (manager, tokens, navigator) = manager(refresher.clone(), "/closet");
        manager.establish(session("old"));
        assert_eq!(navigator.history(), vec!["/closet"]);

        let all = futures::future::join_all((0..3).map(|_| manager.refresh(None)));
        tokio::pin!(all);
        assert!(futures::poll!(&mut all).is_pending());
        refresher.release();

        for result in all.await {
            assert_eq!(
                result,
                Err(RefreshError::Rejected(
                    "Authentication failed: Token revoked".to_string()
                ))
            );
        }
        assert!(tokens.token().is_none());
        assert!(manager.current_session().is_none());
        assert_eq!(navigator.history(), vec!["/closet", "/login"]);
    }

    #[tokio::test]
    async fn test_failure_on_auth_route_does_not_redirect() {
        let refresher = Arc::new(InstantRefresher {
            calls: AtomicUsize::new(0),
            outcome: Err("Missing refresh token".to_string()),
        });
        let (manager, _, navigator) = manager(refresher, "/signup");

        assert!(manager.refresh(None).await.is_err());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_refresh_times_out_for_every_waiter() {
        let (manager, tokens, navigator) = manager(Arc::new(HangingRefresher), "/closet");
        tokens.set_token(Some(AccessToken::new("stale")));

        let (a, b, c) = tokio::join!(
            manager.refresh(Some("POST /clothes/embedded")),
            manager.refresh(Some("POST /clothes/embedded")),
            manager.refresh(Some("POST /clothes/embedded")),
        );

        let expected = Err(RefreshError::TimedOut(Duration::from_secs(12)));
        assert_eq!(a, expected);
        assert_eq!(b, expected);
        assert_eq!(c, expected);
        assert_eq!(manager.refresh_cycles(), 1);
        assert!(tokens.token().is_none());
        assert_eq!(navigator.history(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_token_written_before_waiters_resume() {
        let refresher = GatedRefresher::new(Ok(session("fresh")));
        let (manager, tokens, _) = manager(refresher.clone(), "/closet");

        let observed = {
            let manager = manager.clone();
            let tokens = Arc::clone(&tokens);
            async move {
                manager.refresh(None).await.unwrap();
                tokens.token()
            }
        };
        let observed = tokio::spawn(observed);
        tokio::task::yield_now().await;
        refresher.release();

        assert_eq!(observed.await.unwrap(), Some(AccessToken::new("fresh")));
    }

    #[tokio::test]
    async fn test_refresh_without_user_keeps_identity() {
        let refresher = Arc::new(InstantRefresher {
            calls: AtomicUsize::new(0),
            outcome: Ok(Session::new(AccessToken::new("tok3"), None)),
        });
        let (manager, _, _) = manager(refresher, "/closet");
        manager.establish(session("tok1"));

        let refreshed = manager.refresh(None).await.unwrap();
        assert_eq!(refreshed.user, Some(user()));
        assert_eq!(manager.current_user(), Some(user()));
        assert_eq!(
            manager.current_session().unwrap().access_token.as_str(),
            "tok3"
        );
    }

    #[tokio::test]
    async fn test_rehydrate_marks_checked_on_failure() {
        let refresher = Arc::new(InstantRefresher {
            calls: AtomicUsize::new(0),
            outcome: Err("Missing refresh token".to_string()),
        });
        let (manager, _, navigator) = manager(refresher, "/login");
        assert!(!manager.has_checked_session());

        assert!(manager.rehydrate().await.is_none());
        assert!(manager.has_checked_session());
        manager.wait_until_checked().await;
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_rehydrate_joins_inflight_refresh() {
        let refresher = GatedRefresher::new(Ok(session("tok2")));
        let (manager, _, _) = manager(refresher.clone(), "/closet");

        let both = futures::future::join(
            manager.refresh(Some("GET /clothes/random")),
            manager.rehydrate(),
        );
        tokio::pin!(both);
        assert!(futures::poll!(&mut both).is_pending());
        refresher.release();

        let (from_401, restored) = both.await;
        assert_eq!(refresher.calls(), 1);
        assert_eq!(from_401.unwrap(), restored.unwrap());
        assert!(manager.has_checked_session());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rehydrate_is_bounded_by_deadline() {
        let (manager, _, _) = manager(Arc::new(HangingRefresher), "/");
        assert!(manager.rehydrate().await.is_none());
        assert!(manager.has_checked_session());
    }

    #[tokio::test]
    async fn test_clear_forgets_session() {
        let refresher = Arc::new(HangingRefresher);
        let (manager, tokens, _) = manager(refresher, "/closet");
        manager.establish(session("tok"));
        assert!(manager.is_authenticated());

        manager.clear();
        assert!(!manager.is_authenticated());
        assert!(tokens.token().is_none());
        assert!(manager.current_user().is_none());
    }
}
