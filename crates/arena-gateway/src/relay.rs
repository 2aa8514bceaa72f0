use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use http::header::{HeaderValue, SET_COOKIE};

use crate::error::GatewayResult;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Keeps every `Set-Cookie` the API answers with, so a server calling on
/// behalf of a browser can pass renewed credentials back to it.
pub struct CookieRelay {
    inner: Arc<dyn Transport>,
    issued: Mutex<Vec<HeaderValue>>,
}

impl CookieRelay {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Drains the collected `Set-Cookie` values in the order they arrived.
    pub fn take_issued(&self) -> Vec<HeaderValue> {
        std::mem::take(&mut *self.issued.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl Transport for CookieRelay {
    async fn send(&self, request: &ApiRequest) -> GatewayResult<ApiResponse> {
        let response = self.inner.send(request).await?;

        let cookies = response.headers.get_all(SET_COOKIE).iter().cloned();
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(cookies);

        Ok(response)
    }
}
