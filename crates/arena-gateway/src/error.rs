use http::StatusCode;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// No response was received from the server.
    #[error("network error: {0}")]
    Network(String),

    /// Any non-2xx response that is not a first-time 401.
    #[error("request failed with status {status}")]
    Client { status: StatusCode, body: String },

    /// A 401 triggered a credential refresh and the refresh failed.
    #[error("session expired")]
    SessionExpired,

    /// Gave up waiting for a refresh started by another request.
    #[error("timed out waiting for credential refresh")]
    Timeout,

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, GatewayError::SessionExpired)
    }
}
