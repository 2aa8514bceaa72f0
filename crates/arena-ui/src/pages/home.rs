use arena_types::{AccountSummary, Role, SessionState};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::toast::ToastContext;
use crate::session::SessionContext;

/// A profile fetched on the browser's behalf, with the session as it stands
/// after whatever credential refresh the fetch needed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileFetch {
    pub session: SessionState,
    pub profile: Result<AccountSummary, String>,
}

#[server]
async fn get_profile(role: Role) -> Result<ProfileFetch, ServerFnError> {
    use std::sync::Arc;

    use arena_gateway::{ApiClient, CookieRelay, GatewayConfig, HttpTransport, MemorySessionStore};
    use http::header::SET_COOKIE;
    use leptos_axum::ResponseOptions;

    let config = use_context::<GatewayConfig>()
        .ok_or_else(|| ServerFnError::new("gateway config unavailable"))?;
    let headers: http::HeaderMap = leptos_axum::extract().await?;

    let transport = HttpTransport::with_forwarded_cookies(&config, &headers)
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    let relay = Arc::new(CookieRelay::new(Arc::new(transport)));
    let session = MemorySessionStore::with_role(role);
    let client = ApiClient::new(relay.clone(), Arc::new(session.clone()), config.refresh_policy());

    let profile = client
        .get::<AccountSummary>(&format!("/{}/profile", role.path_segment()))
        .await;

    // Renewed access cookies go back to the browser.
    let responseOptions = expect_context::<ResponseOptions>();
    for cookie in relay.take_issued() {
        responseOptions.append_header(SET_COOKIE, cookie);
    }

    Ok(ProfileFetch {
        session: session.snapshot(),
        profile: profile.map_err(|e| e.to_string()),
    })
}

fn role_blurb(role: Role) -> &'static str {
    match role {
        Role::User => "Find a pitch, book a slot and pay in one go.",
        Role::Trainer => "Publish training sessions and manage your attendees.",
        Role::Owner => "List your stadiums, set availability and track bookings.",
        Role::Admin => "Review accounts, venues and platform activity.",
    }
}

#[component]
pub fn HomePage(role: Role) -> impl IntoView {
    #[allow(unused_variables)]
    let session = expect_context::<SessionContext>();
    #[allow(unused_variables)]
    let toasts = expect_context::<ToastContext>();
    #[allow(unused_variables)]
    let (profile, setProfile) = signal(Option::<Result<AccountSummary, String>>::None);

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        spawn_local(async move {
            let result = match get_profile(role).await {
                Ok(fetch) => {
                    // A failed refresh has logged the gateway session out;
                    // the guards pick that up from here.
                    if !fetch.session.is_authenticated {
                        toasts.error("Your session has expired. Please sign in again.");
                    }
                    if fetch.session != session.state.get_untracked() {
                        session.state.set(fetch.session);
                    }
                    fetch.profile
                }
                Err(e) => Err(e.to_string()),
            };
            setProfile.set(Some(result));
        });
    }

    view! {
        <div class="dashboard-header">
            <h1>{role.label()}</h1>
            <p class="subtitle">{role_blurb(role)}</p>
        </div>
        {move || match profile.get() {
            None => {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Loading your account..."
                    </div>
                }
                    .into_any()
            }
            Some(Ok(account)) => {
                view! {
                    <div class="card">
                        <p>"Signed in as " <strong>{account.email}</strong></p>
                    </div>
                }
                    .into_any()
            }
            Some(Err(e)) => {
                view! {
                    <div class="card">
                        <p class="login-error">"Failed to load your account: " {e}</p>
                    </div>
                }
                    .into_any()
            }
        }}
    }
}
