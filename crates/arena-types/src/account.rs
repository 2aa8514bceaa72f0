use serde::{Deserialize, Serialize};

use crate::Role;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Error body returned by the API for any non-2xx response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
