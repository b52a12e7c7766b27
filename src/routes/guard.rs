//! Route guards: redirect policy for the authenticated area and login page.
//!
//! The decision itself is the pure [`decide`]; the middlewares only resolve
//! the session and act on it. A redirect short-circuits the nested handler,
//! which therefore never starts before the check has finished.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::hooks::{Locals, session_failure};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/home";

/// Authorization policy shared by a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Authenticated,
    LoginOnly,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

#[must_use]
pub fn decide(class: RouteClass, authenticated: bool) -> GuardDecision {
    match (class, authenticated) {
        (RouteClass::Authenticated, false) => GuardDecision::Redirect(LOGIN_PATH),
        (RouteClass::LoginOnly, true) => GuardDecision::Redirect(LANDING_PATH),
        _ => GuardDecision::Proceed,
    }
}

/// Fallback for handlers that find no user despite their group's guard.
pub(crate) fn redirect_to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

async fn enforce(state: &AppState, locals: &Locals, class: RouteClass, req: Request, next: Next) -> Response {
    let resolved = match locals.0.safe_get_session(state).await {
        Ok(resolved) => resolved,
        Err(e) => return session_failure(e),
    };

    match decide(class, resolved.is_authenticated()) {
        GuardDecision::Proceed => next.run(req).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %req.uri().path(), to, "guard redirect");
            Redirect::to(to).into_response()
        }
    }
}

/// Layout guard for the authenticated area: anonymous requests go to login.
pub async fn require_user(State(state): State<AppState>, locals: Locals, req: Request, next: Next) -> Response {
    enforce(&state, &locals, RouteClass::Authenticated, req, next).await
}

/// Login page guard: signed-in users go to the landing page.
pub async fn redirect_authenticated(
    State(state): State<AppState>,
    locals: Locals,
    req: Request,
    next: Next,
) -> Response {
    enforce(&state, &locals, RouteClass::LoginOnly, req, next).await
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
