#![allow(non_snake_case)]

//! Authenticated HTTP gateway for the booking API.
//!
//! [`ApiClient`] sends requests through a [`Transport`] and hides access-token
//! expiry from its callers: the first 401 a request sees triggers one shared
//! credential refresh through the [`RefreshCoordinator`], after which the
//! request is replayed once.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http_transport;
pub mod relay;
pub mod session;
pub mod transport;

pub use client::{ApiClient, RequestOptions};
pub use config::GatewayConfig;
pub use coordinator::{RefreshCoordinator, RefreshOutcome, RefreshPolicy};
pub use error::{GatewayError, GatewayResult};
pub use http_transport::HttpTransport;
pub use relay::CookieRelay;
pub use session::{MemorySessionStore, SessionStore};
pub use transport::{ApiRequest, ApiResponse, Transport};

#[cfg(test)]
pub(crate) mod testing;
