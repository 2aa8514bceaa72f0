use std::sync::Arc;

use async_trait::async_trait;
use http::header::COOKIE;
use http::HeaderMap;
use reqwest::cookie::Jar;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// `reqwest` transport. Session cookies set by the server, including those
/// rotated by a refresh, are kept in the client's cookie store and sent on
/// every later request.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        Self::build(config, reqwest::Client::builder().cookie_store(true))
    }

    /// Transport whose cookie store starts out with the cookies of an
    /// incoming request, for calling the API on behalf of a browser.
    pub fn with_forwarded_cookies(config: &GatewayConfig, headers: &HeaderMap) -> GatewayResult<Self> {
        let baseUrl = reqwest::Url::parse(&config.base_url)
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid base url {}: {e}", config.base_url)))?;

        let jar = Jar::default();
        let mut forwarded = 0;
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';').map(str::trim).filter(|pair| pair.contains('=')) {
                jar.add_cookie_str(&format!("{pair}; Path=/"), &baseUrl);
                forwarded += 1;
            }
        }
        debug!(forwarded, "seeded cookie store from incoming request");

        Self::build(config, reqwest::Client::builder().cookie_provider(Arc::new(jar)))
    }

    fn build(config: &GatewayConfig, builder: reqwest::ClientBuilder) -> GatewayResult<Self> {
        let client = builder
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::InvalidRequest(format!("creating HTTP client: {e}")))?;

        debug!("http transport initialized with base_url={}", config.base_url);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> GatewayResult<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        debug!(method = %request.method, path = %request.path, status = %status, "response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
