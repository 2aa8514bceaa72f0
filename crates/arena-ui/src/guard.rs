//! Render decisions for role-restricted and public-only views.
//!
//! Both guards are pure functions of the session snapshot and their
//! configuration. Side effects (navigation) are applied by the components in
//! [`crate::components::guard`] through a [`NavigationLatch`].

use arena_types::{Role, SessionState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading: show a neutral placeholder, do not navigate.
    Placeholder,
    Render,
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestrictedViewConfig {
    pub required_role: Option<Role>,
    pub excluded_roles: Vec<Role>,
    pub fallback_path: String,
}

impl RestrictedViewConfig {
    pub fn requiring(role: Role, fallbackPath: impl Into<String>) -> Self {
        Self {
            required_role: Some(role),
            excluded_roles: Vec::new(),
            fallback_path: fallbackPath.into(),
        }
    }

    pub fn excluding(roles: Vec<Role>, fallbackPath: impl Into<String>) -> Self {
        Self {
            required_role: None,
            excluded_roles: roles,
            fallback_path: fallbackPath.into(),
        }
    }
}

pub fn restricted_view(session: &SessionState, config: &RestrictedViewConfig) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Placeholder;
    }

    let allowed = match (session.is_authenticated, session.role) {
        (true, Some(role)) => {
            config.required_role.map_or(true, |required| required == role)
                && !config.excluded_roles.contains(&role)
        }
        (true, None) => config.required_role.is_none(),
        (false, _) => false,
    };

    if allowed {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(config.fallback_path.clone())
    }
}

pub fn public_only_view(session: &SessionState) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Placeholder;
    }

    match (session.is_authenticated, session.role) {
        (true, Some(role)) => GuardDecision::Redirect(role.home_path().to_string()),
        _ => GuardDecision::Render,
    }
}

/// Lets a guard navigate at most once, however often its decision is re-evaluated.
#[derive(Clone, Debug, Default)]
pub struct NavigationLatch {
    fired: bool,
}

impl NavigationLatch {
    /// Applies `decision`, calling `navigate` only for the first redirect.
    /// Returns whether the children should be rendered.
    pub fn apply(&mut self, decision: &GuardDecision, navigate: impl FnOnce(&str)) -> bool {
        match decision {
            GuardDecision::Render => true,
            GuardDecision::Placeholder => false,
            GuardDecision::Redirect(path) => {
                if !self.fired {
                    self.fired = true;
                    navigate(path);
                }
                false
            }
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
