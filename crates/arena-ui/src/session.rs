use arena_types::{Role, SessionState};
use leptos::prelude::*;

/// Session as seen by the browser. Starts out loading until the server has
/// looked at the session cookies.
#[derive(Clone, Copy)]
pub struct SessionContext {
    pub state: RwSignal<SessionState>,
}

impl SessionContext {
    pub fn login(&self, role: Role) {
        self.state.set(SessionState::authenticated(role));
    }

    pub fn logout(&self) {
        self.state.set(SessionState::anonymous());
    }

    pub fn role(&self) -> Option<Role> {
        self.state.with(|session| session.role)
    }
}

#[server]
pub async fn current_session() -> Result<SessionState, ServerFnError> {
    use arena_api::AppState;

    let appState =
        use_context::<AppState>().ok_or_else(|| ServerFnError::new("auth context unavailable"))?;
    let headers: http::HeaderMap = leptos_axum::extract().await?;

    Ok(appState.session_for(&headers).await)
}

#[server]
pub async fn end_session() -> Result<(), ServerFnError> {
    use arena_api::AppState;
    use http::header::{HeaderValue, SET_COOKIE};
    use leptos_axum::ResponseOptions;

    let appState =
        use_context::<AppState>().ok_or_else(|| ServerFnError::new("auth context unavailable"))?;
    let headers: http::HeaderMap = leptos_axum::extract().await?;
    appState.logout(&headers).await;

    let responseOptions = expect_context::<ResponseOptions>();
    for cookie in appState.cleared_cookies() {
        responseOptions.append_header(
            SET_COOKIE,
            HeaderValue::from_str(&cookie.to_string())
                .map_err(|e| ServerFnError::new(format!("cookie error: {e}")))?,
        );
    }

    Ok(())
}

/// Provides [`SessionContext`] to everything below it.
#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let state = RwSignal::new(SessionState::loading());
    provide_context(SessionContext { state });

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        spawn_local(async move {
            let resolved = current_session().await.unwrap_or_else(|e| {
                leptos::logging::warn!("could not resolve session: {e}");
                SessionState::anonymous()
            });
            state.set(resolved);
        });
    }

    children()
}
