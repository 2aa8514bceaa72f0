use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arena_types::Role;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Grant {
    account_id: String,
    role: Role,
    expires_at: Instant,
}

impl Grant {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
struct Grants {
    access: HashMap<String, Grant>,
    refresh: HashMap<String, Grant>,
}

impl Grants {
    fn prune(&mut self, now: Instant) {
        self.access.retain(|_, grant| grant.is_live(now));
        self.refresh.retain(|_, grant| grant.is_live(now));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Who an access token was issued to.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub account_id: String,
    pub role: Role,
}

/// Opaque access and refresh tokens held in memory.
#[derive(Clone, Debug)]
pub struct TokenStore {
    grants: Arc<RwLock<Grants>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenStore {
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            grants: Arc::new(RwLock::new(Grants::default())),
            access_ttl,
            refresh_ttl,
        }
    }

    pub async fn issue(&self, accountId: &str, role: Role) -> IssuedTokens {
        let now = Instant::now();
        let tokens = IssuedTokens {
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Uuid::new_v4().simple().to_string(),
        };

        let mut grants = self.grants.write().await;
        grants.prune(now);
        grants.access.insert(
            tokens.access_token.clone(),
            Grant {
                account_id: accountId.to_string(),
                role,
                expires_at: now + self.access_ttl,
            },
        );
        grants.refresh.insert(
            tokens.refresh_token.clone(),
            Grant {
                account_id: accountId.to_string(),
                role,
                expires_at: now + self.refresh_ttl,
            },
        );
        tokens
    }

    /// Exchanges a live refresh token of `role` for a new access token.
    ///
    /// Access tokens previously issued to the same account and role stop
    /// working.
    pub async fn refresh(&self, refreshToken: &str, role: Role) -> Option<String> {
        let now = Instant::now();
        let mut grants = self.grants.write().await;
        grants.prune(now);

        let grant = grants
            .refresh
            .get(refreshToken)
            .filter(|grant| grant.role == role)?
            .clone();

        grants
            .access
            .retain(|_, access| !(access.account_id == grant.account_id && access.role == grant.role));

        let accessToken = Uuid::new_v4().simple().to_string();
        grants.access.insert(
            accessToken.clone(),
            Grant {
                expires_at: now + self.access_ttl,
                ..grant
            },
        );
        debug!(role = %role, "access token renewed");
        Some(accessToken)
    }

    pub async fn authenticate(&self, accessToken: &str) -> Option<Principal> {
        let now = Instant::now();
        let grants = self.grants.read().await;
        grants
            .access
            .get(accessToken)
            .filter(|grant| grant.is_live(now))
            .map(|grant| Principal {
                account_id: grant.account_id.clone(),
                role: grant.role,
            })
    }

    /// Owner of a live refresh token, without consuming it.
    pub async fn refresh_principal(&self, refreshToken: &str) -> Option<Principal> {
        let now = Instant::now();
        let grants = self.grants.read().await;
        grants
            .refresh
            .get(refreshToken)
            .filter(|grant| grant.is_live(now))
            .map(|grant| Principal {
                account_id: grant.account_id.clone(),
                role: grant.role,
            })
    }

    /// Drops a refresh token and every access token of the same account and role.
    pub async fn revoke(&self, refreshToken: &str) {
        let mut grants = self.grants.write().await;
        if let Some(grant) = grants.refresh.remove(refreshToken) {
            grants
                .access
                .retain(|_, access| !(access.account_id == grant.account_id && access.role == grant.role));
        }
    }

    pub async fn expire_access_tokens(&self) {
        let now = Instant::now();
        let mut grants = self.grants.write().await;
        for grant in grants.access.values_mut() {
            grant.expires_at = now;
        }
    }

    /// Number of access and refresh grants currently held.
    pub async fn grant_count(&self) -> (usize, usize) {
        let grants = self.grants.read().await;
        (grants.access.len(), grants.refresh.len())
    }

    pub async fn revoke_all(&self) {
        let mut grants = self.grants.write().await;
        grants.access.clear();
        grants.refresh.clear();
    }
}
