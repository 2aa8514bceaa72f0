use arena_types::{AccountSummary, Role};
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Extension, Json, Router,
};

use crate::error::ApiError;
use crate::middleware::auth::{require_access, AppState};
use crate::tokens::Principal;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:role/profile", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state, require_access))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(role): Path<Role>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AccountSummary>, ApiError> {
    if principal.role != role {
        return Err(ApiError::Forbidden);
    }

    state
        .account(&principal.account_id)
        .map(|account| Json(account.summary()))
        .ok_or(ApiError::AccountNotFound)
}
