pub mod profile;

use axum::{routing::get, Router};

use crate::middleware::auth::AppState;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(profile::routes(state))
}
