use arena_types::ApiMessage;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("access token missing or expired")]
    Unauthorized,

    #[error("refresh token missing or expired")]
    RefreshRejected,

    #[error("session does not belong to this role")]
    Forbidden,

    #[error("account not found")]
    AccountNotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::Unauthorized | ApiError::RefreshRejected => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::AccountNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ApiMessage::new(self.to_string()))).into_response()
    }
}
