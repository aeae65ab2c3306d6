use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

use super::guard::{GuardDecision, RouteGuard};
use super::routes::{Navigator, Route};

/// The current screen, shared between the router and the session layer
#[derive(Default)]
pub struct Location {
    history: Mutex<Vec<Route>>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history.lock().last().copied()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().clone()
    }
}

impl Navigator for Location {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route);
        self.history.lock().push(route);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Entered(Route),
    Redirected { from: Route, to: Route },
}

impl Navigation {
    pub fn landed_on(&self) -> Route {
        match self {
            Navigation::Entered(route) => *route,
            Navigation::Redirected { to, .. } => *to,
        }
    }
}

/// Resolves paths, consults the guard and records where the user ends up
pub struct Router {
    guard: RouteGuard,
    location: Arc<Location>,
}

impl Router {
    pub fn new(guard: RouteGuard, location: Arc<Location>) -> Self {
        Self { guard, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn open(&self, path: &str) -> Navigation {
        self.open_with(path, |_| {})
    }

    /// Navigate to `path`, running `on_enter` only if the target screen is
    /// actually entered
    pub fn open_with<F>(&self, path: &str, on_enter: F) -> Navigation
    where
        F: FnOnce(Route),
    {
        let target = Route::resolve(path);
        match self.guard.can_enter(target) {
            GuardDecision::Allow => {
                self.location.navigate(target);
                on_enter(target);
                Navigation::Entered(target)
            }
            GuardDecision::Redirect(to) => {
                self.location.navigate(to);
                Navigation::Redirected { from: target, to }
            }
        }
    }
}
