use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue, SET_COOKIE};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{GatewayError, GatewayResult};

/// One outbound call, relative to the gateway's base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            query: Vec::new(),
            retried: false,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// True once this request has been replayed after a credential refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the server rotated credentials through the cookie side channel.
    pub fn sets_credentials(&self) -> bool {
        self.headers.contains_key(SET_COOKIE)
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> GatewayResult<T> {
        let raw = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(raw).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Moves a request over the wire.
///
/// Implementations return `Ok` for every HTTP status the server answers
/// with and reserve `Err(GatewayError::Network)` for calls that produced no
/// response at all. Credentials are the transport's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> GatewayResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Stadium {
        name: String,
    }

    #[test]
    fn json_decodes_body() {
        let response = ApiResponse::new(StatusCode::OK, r#"{"name":"North Field"}"#);
        let stadium: Stadium = response.json().unwrap();
        assert_eq!(stadium.name, "North Field");
    }

    #[test]
    fn empty_body_decodes_as_unit() {
        let response = ApiResponse::new(StatusCode::NO_CONTENT, "");
        assert!(response.json::<()>().is_ok());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let response = ApiResponse::new(StatusCode::OK, "<html>");
        let result: GatewayResult<Stadium> = response.json();
        assert!(matches!(result, Err(GatewayError::Decode(_))));
    }

    #[test]
    fn set_cookie_marks_rotated_credentials() {
        let plain = ApiResponse::new(StatusCode::OK, "");
        assert!(!plain.sets_credentials());

        let rotated = plain.with_header(SET_COOKIE, HeaderValue::from_static("access_token=abc"));
        assert!(rotated.sets_credentials());
    }

    #[test]
    fn fresh_request_is_not_retried() {
        let mut request = ApiRequest::new(Method::GET, "/user/bookings");
        assert!(!request.is_retried());
        request.mark_retried();
        assert!(request.is_retried());
    }
}
