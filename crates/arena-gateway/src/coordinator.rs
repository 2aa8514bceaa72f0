use std::sync::Arc;
use std::time::Duration;

use arena_types::Role;
use http::Method;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Renewed,
    Expired,
}

#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    /// How long a caller waits on a refresh before giving up.
    pub wait_timeout: Duration,
    /// Treat a 2xx refresh without `Set-Cookie` as a failed refresh.
    pub require_credential_rotation: bool,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(30),
            require_credential_rotation: false,
        }
    }
}

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    policy: RefreshPolicy,
    state: Mutex<RefreshState>,
}

/// Single-flight credential renewal for one API base URL.
///
/// Every caller of [`renew`](Self::renew) parks a continuation in a FIFO
/// queue. The first caller to find no refresh in flight starts one; the
/// others only wait for it. When the refresh finishes the queue is drained
/// in arrival order with the shared outcome.
///
/// The refresh call runs on its own task, so dropping the caller that
/// started it does not strand the rest of the queue.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                policy,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Waits for fresh credentials, starting a refresh if none is in flight.
    ///
    /// Fails with `SessionExpired` when the refresh fails (the session store
    /// has already been logged out by then) and with `Timeout` when the
    /// refresh outlives the policy's wait timeout.
    pub async fn renew(&self) -> GatewayResult<()> {
        let (sender, receiver) = oneshot::channel();

        let startedRole = {
            let mut state = self.inner.state.lock().await;
            state.waiters.push(sender);
            if state.in_progress {
                debug!(queued = state.waiters.len(), "refresh in flight, waiting");
                None
            } else {
                state.in_progress = true;
                Some(self.inner.session.role())
            }
        };

        if let Some(role) = startedRole {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let call = tokio::spawn({
                    let inner = Arc::clone(&inner);
                    async move { inner.refresh_outcome(role).await }
                });
                let outcome = call.await.unwrap_or_else(|e| {
                    warn!(error = %e, "refresh task aborted");
                    RefreshOutcome::Expired
                });
                inner.finish_refresh(outcome).await;
            });
        }

        match tokio::time::timeout(self.inner.policy.wait_timeout, receiver).await {
            Ok(Ok(RefreshOutcome::Renewed)) => Ok(()),
            Ok(Ok(RefreshOutcome::Expired)) => Err(GatewayError::SessionExpired),
            Ok(Err(_)) => {
                warn!("refresh task ended without reporting an outcome");
                Err(GatewayError::SessionExpired)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.inner.policy.wait_timeout.as_millis() as u64,
                    "gave up waiting for credential refresh"
                );
                Err(GatewayError::Timeout)
            }
        }
    }

    pub async fn is_refreshing(&self) -> bool {
        self.inner.state.lock().await.in_progress
    }

    /// Number of callers parked on the refresh currently in flight.
    pub async fn pending_waiters(&self) -> usize {
        self.inner.state.lock().await.waiters.len()
    }
}

impl Inner {
    async fn refresh_outcome(&self, role: Option<Role>) -> RefreshOutcome {
        match role {
            Some(role) => self.request_renewal(role).await,
            None => {
                warn!("no role in session, cannot pick a refresh endpoint");
                RefreshOutcome::Expired
            }
        }
    }

    /// Clears the in-flight flag, logs out on failure and drains the queue.
    async fn finish_refresh(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().await;
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };

        if outcome == RefreshOutcome::Expired {
            self.session.logout();
        }

        info!(?outcome, waiters = waiters.len(), "credential refresh finished");
        for waiter in waiters {
            // A closed receiver belongs to a caller that timed out or was dropped.
            let _ = waiter.send(outcome);
        }
    }

    async fn request_renewal(&self, role: Role) -> RefreshOutcome {
        let request = ApiRequest::new(Method::POST, role.refresh_path());
        debug!(role = %role, path = %request.path, "refreshing credentials");

        match self.transport.send(&request).await {
            Ok(response) if response.is_success() => {
                if self.policy.require_credential_rotation && !response.sets_credentials() {
                    warn!(
                        role = %role,
                        status = %response.status,
                        "refresh succeeded without issuing credentials"
                    );
                    RefreshOutcome::Expired
                } else {
                    RefreshOutcome::Renewed
                }
            }
            Ok(response) => {
                warn!(role = %role, status = %response.status, "refresh rejected");
                RefreshOutcome::Expired
            }
            Err(e) => {
                warn!(role = %role, error = %e, "refresh call failed");
                RefreshOutcome::Expired
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, RecordingSession};
    use http::StatusCode;

    fn coordinator(
        backend: &Arc<FakeBackend>,
        session: &Arc<RecordingSession>,
        policy: RefreshPolicy,
    ) -> RefreshCoordinator {
        RefreshCoordinator::new(backend.clone(), session.clone(), policy)
    }

    async fn wait_for_waiters(coordinator: &RefreshCoordinator, count: usize) {
        while coordinator.pending_waiters().await < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let backend = Arc::new(FakeBackend::gated());
        let session = Arc::new(RecordingSession::new(Some(Role::Trainer)));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.renew().await })
            })
            .collect();

        wait_for_waiters(&coordinator, 5).await;
        assert!(coordinator.is_refreshing().await);
        backend.open_refresh_gate();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(()));
        }
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(backend.refresh_paths(), vec!["/trainer/auth/refresh-token"]);
        assert_eq!(session.logout_calls(), 0);
        assert!(!coordinator.is_refreshing().await);
    }

    #[tokio::test]
    async fn failed_refresh_expires_every_waiter_and_logs_out_once() {
        let backend = Arc::new(FakeBackend::gated().with_refresh_status(StatusCode::UNAUTHORIZED));
        let session = Arc::new(RecordingSession::new(Some(Role::Owner)));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.renew().await })
            })
            .collect();

        wait_for_waiters(&coordinator, 3).await;
        backend.open_refresh_gate();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err(GatewayError::SessionExpired));
        }
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(session.logout_calls(), 1);
        assert_eq!(session.role(), None);
    }

    #[tokio::test]
    async fn network_failure_during_refresh_expires_the_session() {
        let backend = Arc::new(FakeBackend::new().with_refresh_offline());
        let session = Arc::new(RecordingSession::new(Some(Role::User)));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        assert_eq!(coordinator.renew().await, Err(GatewayError::SessionExpired));
        assert_eq!(session.logout_calls(), 1);
    }

    #[tokio::test]
    async fn missing_role_fails_without_calling_the_backend() {
        let backend = Arc::new(FakeBackend::new());
        let session = Arc::new(RecordingSession::new(None));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        assert_eq!(coordinator.renew().await, Err(GatewayError::SessionExpired));
        assert_eq!(backend.refresh_calls(), 0);
        assert_eq!(session.logout_calls(), 1);
    }

    #[tokio::test]
    async fn rotation_policy_rejects_refresh_without_set_cookie() {
        let backend = Arc::new(FakeBackend::new().without_rotation());
        let session = Arc::new(RecordingSession::new(Some(Role::Admin)));
        let strict = RefreshPolicy {
            require_credential_rotation: true,
            ..RefreshPolicy::default()
        };
        let coordinator = coordinator(&backend, &session, strict);

        assert_eq!(coordinator.renew().await, Err(GatewayError::SessionExpired));
        assert_eq!(session.logout_calls(), 1);
    }

    #[tokio::test]
    async fn lenient_policy_accepts_refresh_without_set_cookie() {
        let backend = Arc::new(FakeBackend::new().without_rotation());
        let session = Arc::new(RecordingSession::new(Some(Role::Admin)));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        assert_eq!(coordinator.renew().await, Ok(()));
        assert_eq!(session.logout_calls(), 0);
    }

    #[tokio::test]
    async fn timed_out_waiter_does_not_cancel_the_refresh() {
        let backend = Arc::new(FakeBackend::gated());
        let session = Arc::new(RecordingSession::new(Some(Role::Trainer)));
        let impatient = RefreshPolicy {
            wait_timeout: Duration::from_millis(20),
            ..RefreshPolicy::default()
        };
        let coordinator = coordinator(&backend, &session, impatient);

        assert_eq!(coordinator.renew().await, Err(GatewayError::Timeout));
        assert!(coordinator.is_refreshing().await);

        backend.open_refresh_gate();
        while coordinator.is_refreshing().await {
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(session.logout_calls(), 0);
    }

    struct PanickingTransport;

    #[async_trait::async_trait]
    impl Transport for PanickingTransport {
        async fn send(&self, _request: &ApiRequest) -> GatewayResult<crate::transport::ApiResponse> {
            panic!("transport bug");
        }
    }

    #[tokio::test]
    async fn panicking_refresh_expires_waiters_and_resets_state() {
        let session = Arc::new(RecordingSession::new(Some(Role::Owner)));
        let policy = RefreshPolicy {
            wait_timeout: Duration::from_secs(5),
            ..RefreshPolicy::default()
        };
        let coordinator = RefreshCoordinator::new(Arc::new(PanickingTransport), session.clone(), policy);

        assert_eq!(coordinator.renew().await, Err(GatewayError::SessionExpired));
        assert!(!coordinator.is_refreshing().await);
        assert_eq!(session.logout_calls(), 1);

        // The next caller starts a fresh refresh instead of waiting out the timeout.
        assert_eq!(coordinator.renew().await, Err(GatewayError::SessionExpired));
    }

    #[tokio::test]
    async fn completed_refresh_allows_a_new_one() {
        let backend = Arc::new(FakeBackend::new());
        let session = Arc::new(RecordingSession::new(Some(Role::User)));
        let coordinator = coordinator(&backend, &session, RefreshPolicy::default());

        assert_eq!(coordinator.renew().await, Ok(()));
        assert_eq!(coordinator.renew().await, Ok(()));
        assert_eq!(backend.refresh_calls(), 2);
    }
}
