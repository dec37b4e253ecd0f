//! # Access Guard
//!
//! Session value, the two-state auth machine, and the gate every protected
//! view passes through.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                    LoginSucceeded                                       │
//! │   ┌─────────────────┐ ─────────────────► ┌─────────────────┐            │
//! │   │ Unauthenticated │                    │  Authenticated  │            │
//! │   └─────────────────┘ ◄───────────────── └─────────────────┘            │
//! │        ▲       │       LoggedOut | Unauthorized (401)                   │
//! │        └───────┘                                                        │
//! │   LoginFailed / LoggedOut / Unauthorized                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Contract
//! [`AccessGuard::check`] runs BEFORE a protected view renders or dispatches
//! its data fetch. A redirect means no fetch happens at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Session
// =============================================================================

/// The in-memory session.
///
/// `authenticated` is derived, never stored: it is true exactly when a
/// non-empty token is present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Builds a session from a possibly-absent token. Empty tokens count as absent.
    pub fn new(token: Option<String>) -> Self {
        Session {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Session { token: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}

// never print the token
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

// =============================================================================
// Auth State Machine
// =============================================================================

/// Whether protected views may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// Events that move the auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoginSucceeded,
    LoginFailed,
    LoggedOut,
    /// A 401 on an authenticated call.
    Unauthorized,
}

impl AuthState {
    /// Applies one event. Only a successful login enters `Authenticated`.
    pub fn transition(self, event: AuthEvent) -> AuthState {
        match event {
            AuthEvent::LoginSucceeded => AuthState::Authenticated,
            AuthEvent::LoginFailed => self,
            AuthEvent::LoggedOut | AuthEvent::Unauthorized => AuthState::Unauthenticated,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Views of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", content = "id", rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    AddComponent,
    Scan,
    Database,
    ComponentDetails(String),
    Settings,
}

impl Route {
    /// Everything except the login page is protected.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::AddComponent => "/add-component".to_string(),
            Route::Scan => "/scan".to_string(),
            Route::Database => "/database".to_string(),
            Route::ComponentDetails(id) => format!("/component/{}", id),
            Route::Settings => "/settings".to_string(),
        }
    }

    /// Parses an application path such as `/component/aB3dE9xZ`.
    pub fn from_path(path: &str) -> CoreResult<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Ok(Route::Dashboard),
            "/login" => Ok(Route::Login),
            "/add-component" => Ok(Route::AddComponent),
            "/scan" => Ok(Route::Scan),
            "/database" => Ok(Route::Database),
            "/settings" => Ok(Route::Settings),
            other => match other.strip_prefix("/component/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Ok(Route::ComponentDetails(id.to_string()))
                }
                _ => Err(CoreError::UnknownRoute(path.to_string())),
            },
        }
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested view (and let it fetch).
    Render(Route),
    /// Replace the view with the login entry point.
    Redirect(Route),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Render(_))
    }

    /// The view that will actually be shown.
    pub fn route(&self) -> &Route {
        match self {
            GuardDecision::Render(r) | GuardDecision::Redirect(r) => r,
        }
    }
}

/// Gate for protected views.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// True when protected views may render.
    pub fn can_enter(session: &Session) -> bool {
        session.is_authenticated()
    }

    /// Decides what to show for `route`.
    pub fn check(route: Route, session: &Session) -> GuardDecision {
        if !route.is_protected() || Self::can_enter(session) {
            GuardDecision::Render(route)
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }
}
