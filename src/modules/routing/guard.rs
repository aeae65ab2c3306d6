use log::debug;
use std::sync::Arc;

use super::routes::Route;
use crate::modules::auth::session::{SessionManager, LOGIN_REQUIRED};
use crate::modules::notifications::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Gates protected routes on the presence of a session token.
///
/// Synchronous and offline: a token that the server no longer accepts is
/// caught by the request pipeline on the first API call instead.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionManager>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn can_enter(&self, target: Route) -> GuardDecision {
        if !target.requires_auth() || self.session.is_authenticated() {
            return GuardDecision::Allow;
        }
        debug!("Blocked navigation to {} without a session", target);
        self.session.show_message(LOGIN_REQUIRED, NotificationKind::Info);
        GuardDecision::Redirect(Route::Login)
    }
}
