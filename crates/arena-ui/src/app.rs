use arena_types::Role;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    StaticSegment,
};

use crate::components::guard::{PublicOnlyView, RestrictedView};
use crate::components::nav::Nav;
use crate::components::toast::ToastProvider;
use crate::pages::home::HomePage;
use crate::pages::login::LoginPage;
use crate::session::SessionProvider;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/arena-console.css" />
        <Title text="Arena" />
        <SessionProvider>
            <ToastProvider>
                <Router>
                    <Routes fallback=|| view! { <p>"Page not found."</p> }.into_any()>
                        <Route path=StaticSegment("login") view=LoginView />
                        <Route path=StaticSegment("") view=|| view! { <RoleView role=Role::User /> } />
                        <Route
                            path=StaticSegment("trainer")
                            view=|| view! { <RoleView role=Role::Trainer /> }
                        />
                        <Route
                            path=StaticSegment("owner")
                            view=|| view! { <RoleView role=Role::Owner /> }
                        />
                        <Route
                            path=StaticSegment("admin")
                            view=|| view! { <RoleView role=Role::Admin /> }
                        />
                    </Routes>
                </Router>
            </ToastProvider>
        </SessionProvider>
    }
}

#[component]
fn LoginView() -> impl IntoView {
    view! {
        <PublicOnlyView>
            <LoginPage />
        </PublicOnlyView>
    }
}

#[component]
fn RoleView(role: Role) -> impl IntoView {
    view! {
        <RestrictedView required_role=role fallback="/login">
            <div class="app-layout">
                <Nav role=role />
                <main class="main-content">
                    <HomePage role=role />
                </main>
            </div>
        </RestrictedView>
    }
}
