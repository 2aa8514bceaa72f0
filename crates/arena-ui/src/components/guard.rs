use arena_types::Role;
use leptos::prelude::*;
use leptos_router::{hooks::use_navigate, NavigateOptions};

use crate::guard::{
    public_only_view, restricted_view, GuardDecision, NavigationLatch, RestrictedViewConfig,
};
use crate::session::SessionContext;

#[component]
fn GuardPlaceholder() -> impl IntoView {
    view! {
        <div class="loading">
            <div class="spinner"></div>
        </div>
    }
}

/// Runs `decide` against the session, navigating at most once on a redirect.
fn guarded_view(
    decide: impl Fn(&arena_types::SessionState) -> GuardDecision + Send + Sync + 'static,
    children: ChildrenFn,
) -> impl IntoView {
    let session = expect_context::<SessionContext>();
    let decision = Memo::new(move |_| session.state.with(|state| decide(state)));

    let navigate = use_navigate();
    let mut latch = NavigationLatch::default();
    Effect::new(move |_| {
        let current = decision.get();
        latch.apply(&current, |path| {
            navigate(
                path,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            )
        });
    });

    move || match decision.get() {
        GuardDecision::Render => children().into_any(),
        GuardDecision::Placeholder => view! { <GuardPlaceholder /> }.into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
    }
}

/// Renders children only for an authenticated session whose role passes the
/// configured checks; otherwise navigates to `fallback`.
#[component]
pub fn RestrictedView(
    #[prop(optional)] required_role: Option<Role>,
    #[prop(optional)] excluded_roles: Vec<Role>,
    #[prop(into, default = "/login".to_string())] fallback: String,
    children: ChildrenFn,
) -> impl IntoView {
    let config = RestrictedViewConfig {
        required_role,
        excluded_roles,
        fallback_path: fallback,
    };

    guarded_view(move |state| restricted_view(state, &config), children)
}

/// Renders children only for visitors without a session; signed-in users are
/// sent to their role's home.
#[component]
pub fn PublicOnlyView(children: ChildrenFn) -> impl IntoView {
    guarded_view(public_only_view, children)
}
