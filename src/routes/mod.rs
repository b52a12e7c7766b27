//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Routes are grouped by authorization policy. The authenticated area
//! (`/home`, `/drawings`, `/drawing/{id}`) sits behind `guard::require_user`,
//! the login page behind `guard::redirect_authenticated`, and everything else
//! is unrestricted. The session hook wraps all of them so each request gets
//! its own cookie adapter and memoised session.

pub mod guard;
pub mod hooks;
pub mod materials;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use guard::RouteClass;

/// Apply the guard for `class` to every route in `routes`.
fn group(class: RouteClass, routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    match class {
        RouteClass::Authenticated => routes.route_layer(from_fn_with_state(state.clone(), guard::require_user)),
        RouteClass::LoginOnly => routes.route_layer(from_fn_with_state(state.clone(), guard::redirect_authenticated)),
        RouteClass::Unrestricted => routes,
    }
}

pub fn app(state: AppState) -> Router {
    let authed = Router::new()
        .route("/home", get(pages::home))
        .route("/drawings", get(pages::drawings))
        .route("/drawing/{id}", get(pages::drawing));

    let login = Router::new().route("/login", get(pages::login));

    let public = Router::new()
        .route("/", get(pages::root))
        .route("/drawings/create-material", post(materials::create_material))
        .route("/drawings/delete-material", post(materials::delete_material))
        .route("/healthz", get(healthz));

    group(RouteClass::Unrestricted, public, &state)
        .merge(group(RouteClass::Authenticated, authed, &state))
        .merge(group(RouteClass::LoginOnly, login, &state))
        .layer(from_fn(hooks::session_context))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
