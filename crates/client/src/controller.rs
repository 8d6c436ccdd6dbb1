// Session controller
// Decision: Mount performs exactly one refresh attempt; there is no retry loop and no
// periodic refresh
// Decision: A refresh result that arrives after unmount (or after a newer mount) is
// discarded, so a stale answer never overwrites fresher state
// Decision: Logout is best effort; local state becomes Anonymous even if the server
// call fails

use parking_lot::Mutex;
use std::sync::Arc;

use crate::http::{AuthApi, ClientUser, SessionError};
use crate::routes::RouteTable;
use crate::state::{self, SessionState};

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    mounted: bool,
    /// Bumped on every mount/unmount so in-flight refreshes can detect staleness
    generation: u64,
}

/// Owns the session state for one application shell
pub struct SessionController<A: AuthApi> {
    api: Arc<A>,
    table: RouteTable,
    inner: Arc<Mutex<Inner>>,
}

impl<A: AuthApi> Clone for SessionController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            table: self.table.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<A: AuthApi> SessionController<A> {
    pub fn new(api: Arc<A>, table: RouteTable) -> Self {
        Self {
            api,
            table,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn user(&self) -> Option<ClientUser> {
        self.inner.lock().state.user().cloned()
    }

    /// Establish the session on startup
    ///
    /// Skips the network when a user is already known (e.g. right after login).
    /// While this mount's refresh is still in flight, a repeated call returns
    /// `Checking` instead of issuing another request.
    pub async fn mount(&self) -> SessionState {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.mounted && inner.state == SessionState::Checking {
                return SessionState::Checking;
            }
            inner.mounted = true;
            inner.generation += 1;
            if matches!(inner.state, SessionState::Authenticated(_)) {
                return inner.state.clone();
            }
            inner.state = SessionState::Checking;
            inner.generation
        };

        let next = match self.api.refresh().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, role = %user.role, "Session restored");
                SessionState::Authenticated(user)
            }
            Err(e) => {
                if !e.is_auth_failure() {
                    tracing::warn!(error = %e, "Session refresh failed");
                }
                SessionState::Anonymous
            }
        };

        let mut inner = self.inner.lock();
        if inner.mounted && inner.generation == generation {
            inner.state = next;
        } else {
            tracing::debug!("Discarding refresh result for a stale mount");
        }
        inner.state.clone()
    }

    /// Stop accepting results from in-flight requests
    pub fn unmount(&self) {
        let mut inner = self.inner.lock();
        inner.mounted = false;
        inner.generation += 1;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<ClientUser, SessionError> {
        let user = self.api.login(email, password).await?;
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = SessionState::Anonymous;
    }

    /// Where the shell should navigate instead of `path`, if anywhere
    pub fn redirect_for(&self, path: &str) -> Option<String> {
        let inner = self.inner.lock();
        state::redirect_for(&inner.state, path, &self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use uuid::Uuid;

    fn freelancer() -> ClientUser {
        ClientUser {
            id: Uuid::now_v7(),
            email: "maya@example.com".to_string(),
            name: "Maya".to_string(),
            role: "FREELANCER".to_string(),
            email_verified: true,
        }
    }

    #[derive(Default)]
    struct FakeApi {
        session: parking_lot::Mutex<Option<ClientUser>>,
        refresh_calls: AtomicUsize,
        fail_logout: bool,
        /// When set, refresh waits until notified
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn login(&self, email: &str, password: &str) -> Result<ClientUser, SessionError> {
            if password != "correct-horse" {
                return Err(SessionError::Api {
                    status: 401,
                    message: "Invalid email or password".to_string(),
                });
            }
            let user = ClientUser {
                email: email.to_string(),
                ..freelancer()
            };
            *self.session.lock() = Some(user.clone());
            Ok(user)
        }

        async fn refresh(&self) -> Result<ClientUser, SessionError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.session.lock().clone().ok_or(SessionError::Api {
                status: 401,
                message: "Not authenticated".to_string(),
            })
        }

        async fn logout(&self) -> Result<(), SessionError> {
            *self.session.lock() = None;
            if self.fail_logout {
                return Err(SessionError::Decode("connection reset".to_string()));
            }
            Ok(())
        }
    }

    fn controller(api: FakeApi) -> (Arc<FakeApi>, SessionController<FakeApi>) {
        let api = Arc::new(api);
        let controller = SessionController::new(api.clone(), RouteTable::marketplace());
        (api, controller)
    }

    #[tokio::test]
    async fn test_mount_restores_session_with_one_refresh() {
        let (api, controller) = controller(FakeApi {
            session: parking_lot::Mutex::new(Some(freelancer())),
            ..Default::default()
        });

        assert_eq!(controller.state(), SessionState::Unknown);
        assert_eq!(controller.redirect_for("/login"), None);

        let state = controller.mount().await;
        assert_eq!(state.user().map(|u| u.role.as_str()), Some("FREELANCER"));
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            controller.redirect_for("/login").as_deref(),
            Some("/freelancer/dashboard")
        );
        assert_eq!(controller.redirect_for("/freelancer/jobs"), None);
    }

    #[tokio::test]
    async fn test_mount_without_session_is_anonymous() {
        let (api, controller) = controller(FakeApi::default());

        assert_eq!(controller.mount().await, SessionState::Anonymous);
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            controller.redirect_for("/client/dashboard").as_deref(),
            Some("/login")
        );
        assert_eq!(controller.redirect_for("/villas"), None);
    }

    #[tokio::test]
    async fn test_mount_after_login_skips_refresh() {
        let (api, controller) = controller(FakeApi::default());

        controller
            .login("maya@example.com", "correct-horse")
            .await
            .unwrap();
        let state = controller.mount().await;

        assert!(matches!(state, SessionState::Authenticated(_)));
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_state() {
        let (_api, controller) = controller(FakeApi::default());
        controller.mount().await;

        let err = controller
            .login("maya@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(controller.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_clears_state_even_on_error() {
        let (_api, controller) = controller(FakeApi {
            session: parking_lot::Mutex::new(Some(freelancer())),
            fail_logout: true,
            ..Default::default()
        });
        controller.mount().await;
        assert!(controller.user().is_some());

        controller.logout().await;
        assert_eq!(controller.state(), SessionState::Anonymous);
        assert_eq!(
            controller.redirect_for("/freelancer/dashboard").as_deref(),
            Some("/login")
        );
    }

    #[tokio::test]
    async fn test_repeated_mount_shares_in_flight_refresh() {
        let gate = Arc::new(Notify::new());
        let (api, controller) = controller(FakeApi {
            session: parking_lot::Mutex::new(Some(freelancer())),
            gate: Some(gate.clone()),
            ..Default::default()
        });

        let mounting = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mount().await }
        });
        while api.refresh_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.mount().await, SessionState::Checking);
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let state = mounting.await.unwrap();
        assert!(matches!(state, SessionState::Authenticated(_)));
        assert_eq!(controller.state(), state);
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remount_after_unmount_refreshes_again() {
        let gate = Arc::new(Notify::new());
        let (api, controller) = controller(FakeApi {
            session: parking_lot::Mutex::new(Some(freelancer())),
            gate: Some(gate.clone()),
            ..Default::default()
        });

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mount().await }
        });
        while api.refresh_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        controller.unmount();

        let second = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mount().await }
        });
        while api.refresh_calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        gate.notify_one();
        first.await.unwrap();
        let state = second.await.unwrap();
        assert!(matches!(state, SessionState::Authenticated(_)));
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unmount_discards_late_refresh() {
        let gate = Arc::new(Notify::new());
        let (api, controller) = controller(FakeApi {
            session: parking_lot::Mutex::new(Some(freelancer())),
            gate: Some(gate.clone()),
            ..Default::default()
        });

        let mounting = tokio::spawn({
            let controller = controller.clone();
            async move { controller.mount().await }
        });

        // Wait until the refresh is in flight
        while api.refresh_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.state(), SessionState::Checking);

        controller.unmount();
        gate.notify_one();

        let state = mounting.await.unwrap();
        assert_eq!(state, SessionState::Checking);
        assert_eq!(controller.state(), SessionState::Checking);
    }
}
