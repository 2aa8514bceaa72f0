//! In-process fakes for the transport and the session store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use arena_types::Role;
use async_trait::async_trait;
use http::header::{HeaderValue, SET_COOKIE};
use http::StatusCode;
use tokio::sync::Semaphore;

use crate::error::{GatewayError, GatewayResult};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// A backend whose access token is either valid or expired.
///
/// Resource paths answer 200 while credentials are valid and 401 otherwise,
/// except `/broken` (always 500), `/always-unauthorized` (always 401) and
/// `/offline` (no response). Refresh endpoints validate the credentials
/// unless configured to fail, and can be held open with a gate.
pub(crate) struct FakeBackend {
    credentials_valid: AtomicBool,
    refresh_calls: AtomicUsize,
    refresh_paths: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, bool)>>,
    gate: Option<Semaphore>,
    refresh_status: StatusCode,
    refresh_offline: bool,
    rotate: bool,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            credentials_valid: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            refresh_paths: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
            refresh_status: StatusCode::OK,
            refresh_offline: false,
            rotate: true,
        }
    }

    /// Refresh calls block until [`open_refresh_gate`](Self::open_refresh_gate).
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub(crate) fn with_refresh_status(mut self, status: StatusCode) -> Self {
        self.refresh_status = status;
        self
    }

    pub(crate) fn with_refresh_offline(mut self) -> Self {
        self.refresh_offline = true;
        self
    }

    pub(crate) fn without_rotation(mut self) -> Self {
        self.rotate = false;
        self
    }

    pub(crate) fn with_valid_credentials(self) -> Self {
        self.credentials_valid.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn open_refresh_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_paths(&self) -> Vec<String> {
        self.refresh_paths.lock().unwrap().clone()
    }

    /// Retried flags of every call made to `path`, in order.
    pub(crate) fn calls_to(&self, path: &str) -> Vec<bool> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(calledPath, _)| calledPath == path)
            .map(|(_, retried)| *retried)
            .collect()
    }

    /// Paths of replayed calls, in the order they reached the backend.
    pub(crate) fn replay_order(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, retried)| *retried)
            .map(|(path, _)| path.clone())
            .collect()
    }

    async fn refresh(&self, request: &ApiRequest) -> GatewayResult<ApiResponse> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_paths.lock().unwrap().push(request.path.clone());

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.refresh_offline {
            return Err(GatewayError::Network("connection refused".into()));
        }
        if !self.refresh_status.is_success() {
            return Ok(ApiResponse::new(
                self.refresh_status,
                r#"{"message":"refresh token expired"}"#,
            ));
        }

        self.credentials_valid.store(true, Ordering::SeqCst);
        let response = ApiResponse::new(StatusCode::OK, "");
        if self.rotate {
            Ok(response.with_header(
                SET_COOKIE,
                HeaderValue::from_static("access_token=renewed; HttpOnly; Path=/"),
            ))
        } else {
            Ok(response)
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: &ApiRequest) -> GatewayResult<ApiResponse> {
        if request.path.ends_with("/auth/refresh-token") {
            return self.refresh(request).await;
        }

        self.calls
            .lock()
            .unwrap()
            .push((request.path.clone(), request.is_retried()));

        match request.path.as_str() {
            "/offline" => Err(GatewayError::Network("connection reset".into())),
            "/broken" => Ok(ApiResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"message":"boom"}"#,
            )),
            "/always-unauthorized" => Ok(ApiResponse::new(
                StatusCode::UNAUTHORIZED,
                r#"{"message":"nope"}"#,
            )),
            path if self.credentials_valid.load(Ordering::SeqCst) => Ok(ApiResponse::new(
                StatusCode::OK,
                serde_json::json!({ "path": path }).to_string(),
            )),
            _ => Ok(ApiResponse::new(
                StatusCode::UNAUTHORIZED,
                r#"{"message":"access token expired"}"#,
            )),
        }
    }
}

pub(crate) struct RecordingSession {
    role: Mutex<Option<Role>>,
    logouts: AtomicUsize,
}

impl RecordingSession {
    pub(crate) fn new(role: Option<Role>) -> Self {
        Self {
            role: Mutex::new(role),
            logouts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl SessionStore for RecordingSession {
    fn role(&self) -> Option<Role> {
        *self.role.lock().unwrap()
    }

    fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        *self.role.lock().unwrap() = None;
    }
}
