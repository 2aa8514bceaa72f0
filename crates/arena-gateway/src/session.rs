use std::sync::Arc;

use arena_types::{Role, SessionState};
use tokio::sync::watch;
use tracing::info;

/// What the gateway needs from the application's session: read the role to
/// pick a refresh endpoint, and force a logout when renewal fails.
pub trait SessionStore: Send + Sync {
    fn role(&self) -> Option<Role>;
    fn logout(&self);
}

/// Session store kept in memory, observable through a `watch` channel.
#[derive(Clone, Debug)]
pub struct MemorySessionStore {
    state: Arc<watch::Sender<SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(SessionState::anonymous());
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn with_role(role: Role) -> Self {
        let store = Self::new();
        store.login(role);
        store
    }

    /// Records a successful login. Only application login flows call this.
    pub fn login(&self, role: Role) {
        self.state.send_replace(SessionState::authenticated(role));
        info!(role = %role, "session opened");
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn role(&self) -> Option<Role> {
        self.state.borrow().role
    }

    fn logout(&self) {
        let previous = self.state.send_replace(SessionState::anonymous());
        if let Some(role) = previous.role {
            info!(role = %role, "session closed");
        }
    }
}
