//! Top-level route gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! The presentation layer asks [`decide`] on every navigation and on every
//! session change. The decision depends only on the loading flag, whether
//! the session is authenticated and the requested path, so it can be tested
//! without rendering anything.
//!
//! Loading is checked first: nothing protected or public is chosen until the
//! startup restore has settled.

use tokio::sync::watch;

use crate::session::Session;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

// =============================================================================
// ROUTES
// =============================================================================

/// Every destination the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Onboarding,
    Guide,
    Search,
    Favourites,
    Rules,
    Calendar,
    Admin,
}

impl Route {
    /// Reachable only while signed out.
    pub const PUBLIC: [Route; 2] = [Route::Login, Route::Register];

    /// Reachable only while signed in.
    pub const PROTECTED: [Route; 8] = [
        Route::Dashboard,
        Route::Onboarding,
        Route::Guide,
        Route::Search,
        Route::Favourites,
        Route::Rules,
        Route::Calendar,
        Route::Admin,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Register => REGISTER_PATH,
            Self::Dashboard => HOME_PATH,
            Self::Onboarding => "/onboarding",
            Self::Guide => "/guide",
            Self::Search => "/search",
            Self::Favourites => "/favourites",
            Self::Rules => "/rules",
            Self::Calendar => "/calendar",
            Self::Admin => "/admin",
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Match a requested path. Query, fragment and trailing slashes are
    /// ignored and the comparison is ASCII case-insensitive.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let normalized = normalize_path(path);
        Self::PUBLIC
            .into_iter()
            .chain(Self::PROTECTED)
            .find(|r| r.path() == normalized)
    }
}

pub(crate) fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with('/') {
        lowered
    } else {
        format!("/{lowered}")
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Which route set is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Outcome of gating one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show the neutral waiting indicator; no route is evaluated.
    Loading,
    /// Replace the requested path with this one.
    RedirectTo(&'static str),
    /// Render the requested route.
    Allow(Route),
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::RedirectTo(path) => write!(f, "redirect {path}"),
            Self::Allow(route) => write!(f, "allow {}", route.path()),
        }
    }
}

#[must_use]
pub fn mode(is_loading: bool, is_authenticated: bool) -> GateMode {
    if is_loading {
        GateMode::Loading
    } else if is_authenticated {
        GateMode::Authenticated
    } else {
        GateMode::Unauthenticated
    }
}

/// Gate a navigation to `path`.
#[must_use]
pub fn decide(is_loading: bool, is_authenticated: bool, path: &str) -> RouteDecision {
    match mode(is_loading, is_authenticated) {
        GateMode::Loading => RouteDecision::Loading,
        GateMode::Unauthenticated => match Route::from_path(path) {
            Some(route) if route.is_public() => RouteDecision::Allow(route),
            _ => RouteDecision::RedirectTo(LOGIN_PATH),
        },
        GateMode::Authenticated => match Route::from_path(path) {
            Some(route) if !route.is_public() => RouteDecision::Allow(route),
            _ => RouteDecision::RedirectTo(HOME_PATH),
        },
    }
}

/// [`decide`] against a session value.
#[must_use]
pub fn decide_for(session: &Session, path: &str) -> RouteDecision {
    decide(session.is_loading, session.is_authenticated(), path)
}

// =============================================================================
// REACTIVE WATCH
// =============================================================================

/// Follows a session channel and re-gates the current path on every change.
/// Redirects are applied to the tracked path, like a replace-navigation.
pub struct RouteWatch {
    session: watch::Receiver<Session>,
    path: String,
}

impl RouteWatch {
    #[must_use]
    pub fn new(session: watch::Receiver<Session>, path: impl Into<String>) -> Self {
        Self { session, path: path.into() }
    }

    /// Path currently displayed (after any applied redirects).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decision for the tracked path against the latest session.
    #[must_use]
    pub fn current(&self) -> RouteDecision {
        decide_for(&self.session.borrow(), &self.path)
    }

    /// Navigate to `path` and return the settled decision.
    pub fn navigate(&mut self, path: impl Into<String>) -> RouteDecision {
        self.path = path.into();
        self.settle()
    }

    /// Wait for the next session change and return the re-gated decision.
    /// Returns `None` once the store has been disposed.
    pub async fn changed(&mut self) -> Option<RouteDecision> {
        self.session.changed().await.ok()?;
        Some(self.settle())
    }

    fn settle(&mut self) -> RouteDecision {
        let decision = decide_for(&self.session.borrow_and_update(), &self.path);
        match decision {
            RouteDecision::RedirectTo(target) => {
                self.path = target.to_owned();
                decide_for(&self.session.borrow(), &self.path)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
