use arena_types::Role;
use leptos::prelude::*;

use crate::components::toast::ToastContext;
use crate::session::SessionContext;

#[server]
async fn login(role: Role, email: String, password: String) -> Result<Role, ServerFnError> {
    use arena_api::AppState;
    use arena_types::LoginRequest;
    use http::header::{HeaderValue, SET_COOKIE};
    use leptos_axum::ResponseOptions;

    use crate::validation::validate_login;

    let credentials = LoginRequest { email, password };
    validate_login(&credentials).map_err(|e| ServerFnError::new(e.to_string()))?;

    let appState =
        use_context::<AppState>().ok_or_else(|| ServerFnError::new("auth context unavailable"))?;
    let (account, issued) = appState
        .login(role, &credentials)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let responseOptions = expect_context::<ResponseOptions>();
    for cookie in appState.session_cookies(&issued) {
        responseOptions.append_header(
            SET_COOKIE,
            HeaderValue::from_str(&cookie.to_string())
                .map_err(|e| ServerFnError::new(format!("cookie error: {e}")))?,
        );
    }

    Ok(account.role)
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = expect_context::<SessionContext>();
    let toasts = expect_context::<ToastContext>();
    let loginAction = ServerAction::<Login>::new();
    let loginValue = loginAction.value();

    // A successful login flips the session; the public-only guard then
    // navigates to the role's home.
    Effect::new(move |_| match loginValue.get() {
        Some(Ok(role)) => session.login(role),
        Some(Err(e)) => toasts.error(e.to_string()),
        None => {}
    });

    view! {
        <div class="login-page">
            <div class="login-card">
                <div class="login-header">
                    <div class="login-icon">"A"</div>
                    <h1>"Arena"</h1>
                    <p>"Sign in to book pitches, sessions and stadiums"</p>
                </div>

                <ActionForm action=loginAction>
                    <div class="form-group">
                        <label for="role">"I am a"</label>
                        <select id="role" name="role">
                            {Role::ALL
                                .into_iter()
                                .map(|role| {
                                    view! {
                                        <option value=role.path_segment()>{role.label()}</option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input type="email" id="email" name="email" required />
                    </div>
                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input type="password" id="password" name="password" required />
                    </div>
                    <button type="submit" class="btn btn-primary">
                        "Sign In"
                    </button>
                </ActionForm>
            </div>
        </div>
    }
}
