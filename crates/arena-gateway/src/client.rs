use std::sync::Arc;

use arena_types::{AccountSummary, LoginRequest, Role};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::coordinator::{RefreshCoordinator, RefreshPolicy};
use crate::error::{GatewayError, GatewayResult};
use crate::http_transport::HttpTransport;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Per-call knobs for [`ApiClient::request`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    /// Surface a 401 as-is instead of renewing credentials.
    pub skip_refresh: bool,
}

impl RequestOptions {
    pub fn without_refresh() -> Self {
        Self {
            skip_refresh: true,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        policy: RefreshPolicy,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(Arc::clone(&transport), session, policy);
        Self {
            transport,
            coordinator,
        }
    }

    /// Builds a client over a cookie-carrying HTTP transport.
    pub fn from_config(
        config: &GatewayConfig,
        session: Arc<dyn SessionStore>,
    ) -> GatewayResult<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), session, config.refresh_policy()))
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Sends a request, renewing credentials once if the server answers 401.
    ///
    /// A request is replayed at most once. A 401 on the replay, or any other
    /// non-2xx status, comes back as `GatewayError::Client`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> GatewayResult<ApiResponse> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request.headers = options.headers;
        request.query = options.query;

        loop {
            let response = self.transport.send(&request).await?;
            if response.is_success() {
                return Ok(response);
            }

            let recoverable = response.status == StatusCode::UNAUTHORIZED
                && !request.is_retried()
                && !options.skip_refresh;
            if !recoverable {
                return Err(GatewayError::Client {
                    status: response.status,
                    body: response.body,
                });
            }

            debug!(method = %request.method, path = %request.path, "access token rejected");
            self.coordinator.renew().await?;
            request.mark_retried();
            debug!(method = %request.method, path = %request.path, "replaying after refresh");
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        self.request(Method::GET, path, None, RequestOptions::default())
            .await?
            .json()
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.request(Method::DELETE, path, None, RequestOptions::default())
            .await
            .map(|_| ())
    }

    /// Authenticates against the role's login endpoint.
    ///
    /// Recording the session is left to the caller's login flow.
    pub async fn login(&self, role: Role, credentials: &LoginRequest) -> GatewayResult<AccountSummary> {
        let body = to_json(credentials)?;
        self.request(
            Method::POST,
            &role.login_path(),
            Some(body),
            RequestOptions::without_refresh(),
        )
        .await?
        .json()
    }

    /// Revokes the role's server-side session.
    pub async fn logout(&self, role: Role) -> GatewayResult<()> {
        self.request(
            Method::POST,
            &role.logout_path(),
            None,
            RequestOptions::without_refresh(),
        )
        .await
        .map(|_| ())
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let body = to_json(body)?;
        self.request(method, path, Some(body), RequestOptions::default())
            .await?
            .json()
    }
}

fn to_json<B: Serialize>(body: &B) -> GatewayResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}
