use arena_types::Role;
use leptos::prelude::*;

use crate::components::toast::ToastContext;
use crate::session::SessionContext;

#[component]
pub fn Nav(role: Role) -> impl IntoView {
    let session = expect_context::<SessionContext>();
    #[allow(unused_variables)]
    let toasts = expect_context::<ToastContext>();

    let handleLogout = move |_| {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen_futures::spawn_local;

            spawn_local(async move {
                match crate::session::end_session().await {
                    Ok(()) => toasts.success("Signed out"),
                    Err(e) => toasts.error(format!("Sign-out failed: {e}")),
                }
                session.logout();
            });
        }
        #[cfg(not(feature = "hydrate"))]
        session.logout();
    };

    view! {
        <nav class="nav-sidebar">
            <div class="nav-brand">
                <div class="brand-icon">"A"</div>
                <span class="brand-text">"Arena"</span>
            </div>
            <ul class="nav-links">
                <li class="nav-item active">
                    <a href=role.home_path()>
                        <span class="nav-icon">"\u{25A3}"</span>
                        <span>{role.label()}</span>
                    </a>
                </li>
            </ul>
            <button class="btn btn-secondary nav-logout" on:click=handleLogout>
                "Sign Out"
            </button>
        </nav>
    }
}
