use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of roles a session can hold.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Trainer,
    Owner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Trainer, Role::Owner, Role::Admin];

    /// Lowercase name used as the first segment of every auth endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Trainer => "trainer",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    /// Landing surface for an authenticated session of this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::User => "/",
            Role::Trainer => "/trainer",
            Role::Owner => "/owner",
            Role::Admin => "/admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "Player",
            Role::Trainer => "Trainer",
            Role::Owner => "Stadium Owner",
            Role::Admin => "Administrator",
        }
    }

    pub fn login_path(self) -> String {
        format!("/{}/auth/login", self.path_segment())
    }

    pub fn refresh_path(self) -> String {
        format!("/{}/auth/refresh-token", self.path_segment())
    }

    pub fn logout_path(self) -> String {
        format!("/{}/auth/logout", self.path_segment())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.path_segment() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Snapshot of the client-side session as seen by guards and the gateway.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_authenticated: false,
            role: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            is_loading: false,
            is_authenticated: false,
            role: None,
        }
    }

    pub fn authenticated(role: Role) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            role: Some(role),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::anonymous()
    }
}
