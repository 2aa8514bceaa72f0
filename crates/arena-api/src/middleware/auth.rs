use std::sync::Arc;

use arena_types::{AccountSummary, LoginRequest, Role, SessionState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::tokens::{IssuedTokens, Principal, TokenStore};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// A demo account loaded from config. Passwords are plain fixtures compared
/// as-is; this service is a development stand-in, not a credential store.
#[derive(Deserialize, Clone, Debug)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Account {
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Vec<Account>>,
    pub tokens: TokenStore,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(accounts: Vec<Account>, tokens: TokenStore, secureCookies: bool) -> Self {
        Self {
            accounts: Arc::new(accounts),
            tokens,
            secure_cookies: secureCookies,
        }
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    /// Checks credentials against the role's accounts and opens a session.
    pub async fn login(
        &self,
        role: Role,
        credentials: &LoginRequest,
    ) -> Result<(AccountSummary, IssuedTokens), ApiError> {
        let account = self
            .accounts
            .iter()
            .find(|account| {
                account.role == role
                    && account.email.eq_ignore_ascii_case(&credentials.email)
                    && account.password == credentials.password
            })
            .ok_or(ApiError::InvalidCredentials)?;

        let issued = self.tokens.issue(&account.id, role).await;
        info!(role = %role, account = %account.id, "login succeeded");
        Ok((account.summary(), issued))
    }

    /// Session a browser holds according to its cookies.
    ///
    /// A live refresh token alone still counts as signed in, since the next
    /// API call will renew the access token. API routes themselves accept
    /// only access tokens.
    pub async fn session_for(&self, headers: &HeaderMap) -> SessionState {
        let jar = CookieJar::from_headers(headers);

        let mut principal = match jar.get(ACCESS_COOKIE) {
            Some(access) => self.tokens.authenticate(access.value()).await,
            None => None,
        };
        if principal.is_none() {
            if let Some(refresh) = jar.get(REFRESH_COOKIE) {
                principal = self.tokens.refresh_principal(refresh.value()).await;
            }
        }

        match principal {
            Some(principal) => SessionState::authenticated(principal.role),
            None => SessionState::anonymous(),
        }
    }

    /// Revokes the session carried by the request's refresh cookie.
    pub async fn logout(&self, headers: &HeaderMap) {
        let jar = CookieJar::from_headers(headers);
        if let Some(refresh) = jar.get(REFRESH_COOKIE) {
            self.tokens.revoke(refresh.value()).await;
        }
    }

    pub fn session_cookies(&self, issued: &IssuedTokens) -> Vec<Cookie<'static>> {
        vec![
            self.cookie(ACCESS_COOKIE, issued.access_token.clone()),
            self.cookie(REFRESH_COOKIE, issued.refresh_token.clone()),
        ]
    }

    /// Set-Cookie values that delete both session cookies.
    pub fn cleared_cookies(&self) -> Vec<Cookie<'static>> {
        [ACCESS_COOKIE, REFRESH_COOKIE]
            .into_iter()
            .map(|name| {
                let mut cookie = self.cookie(name, String::new());
                cookie.make_removal();
                cookie
            })
            .collect()
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .path("/")
            .build()
    }
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/:role/auth/login", post(handle_login))
        .route("/:role/auth/refresh-token", post(handle_refresh))
        .route("/:role/auth/logout", post(handle_logout))
}

async fn handle_login(
    State(state): State<AppState>,
    Path(role): Path<Role>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccountSummary>), ApiError> {
    let (summary, issued) = state.login(role, &body).await.inspect_err(|_| {
        warn!(role = %role, "login rejected");
    })?;

    let jar = state
        .session_cookies(&issued)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));
    Ok((jar, Json(summary)))
}

async fn handle_refresh(
    State(state): State<AppState>,
    Path(role): Path<Role>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let refreshToken = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(ApiError::RefreshRejected)?;

    let accessToken = state
        .tokens
        .refresh(&refreshToken, role)
        .await
        .ok_or(ApiError::RefreshRejected)?;

    let jar = jar.add(state.cookie(ACCESS_COOKIE, accessToken));
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn handle_logout(
    State(state): State<AppState>,
    Path(role): Path<Role>,
    headers: HeaderMap,
) -> (CookieJar, StatusCode) {
    state.logout(&headers).await;
    info!(role = %role, "logged out");

    let jar = state
        .cleared_cookies()
        .into_iter()
        .fold(CookieJar::new(), |jar, cookie| jar.add(cookie));
    (jar, StatusCode::NO_CONTENT)
}

/// Middleware for API routes: accepts the access cookie or `Authorization: Bearer <token>`.
pub async fn require_access(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearerToken = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let cookieToken = CookieJar::from_headers(request.headers())
        .get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let principal = match bearerToken.or(cookieToken) {
        Some(token) => state.tokens.authenticate(&token).await,
        None => None,
    };

    let Some(principal) = principal else {
        return ApiError::Unauthorized.into_response();
    };

    request.extensions_mut().insert::<Principal>(principal);
    next.run(request).await
}
