use super::*;
use axum::http::StatusCode;
use std::sync::Arc;

use crate::state::test_helpers::{
    MockIdentity, MockStore, Reply, live_session, location, request, send, session_cookie_header, test_app_state,
};

// =============================================================================
// decide
// =============================================================================

#[test]
fn authenticated_area_without_user_redirects_to_login() {
    assert_eq!(decide(RouteClass::Authenticated, false), GuardDecision::Redirect(LOGIN_PATH));
}

#[test]
fn authenticated_area_with_user_proceeds() {
    assert_eq!(decide(RouteClass::Authenticated, true), GuardDecision::Proceed);
}

#[test]
fn login_with_user_redirects_to_landing() {
    assert_eq!(decide(RouteClass::LoginOnly, true), GuardDecision::Redirect(LANDING_PATH));
}

#[test]
fn login_without_user_proceeds() {
    assert_eq!(decide(RouteClass::LoginOnly, false), GuardDecision::Proceed);
}

#[test]
fn unrestricted_always_proceeds() {
    assert_eq!(decide(RouteClass::Unrestricted, false), GuardDecision::Proceed);
    assert_eq!(decide(RouteClass::Unrestricted, true), GuardDecision::Proceed);
}

// =============================================================================
// middlewares through the router
// =============================================================================

#[tokio::test]
async fn home_without_cookies_redirects_to_login() {
    let identity = Arc::new(MockIdentity::accepting());
    let state = test_app_state(identity.clone(), Arc::new(MockStore::empty()));

    let response = send(state, request("GET", "/home", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(identity.outbound_calls(), 0);
}

#[tokio::test]
async fn login_with_verified_session_redirects_home() {
    let state = test_app_state(Arc::new(MockIdentity::accepting()), Arc::new(MockStore::empty()));
    let cookie = session_cookie_header(&live_session());

    let response = send(state, request("GET", "/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/home"));
}

#[tokio::test]
async fn login_without_session_renders() {
    let state = test_app_state(Arc::new(MockIdentity::accepting()), Arc::new(MockStore::empty()));

    let response = send(state, request("GET", "/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_unverifiable_session_renders() {
    let state = test_app_state(Arc::new(MockIdentity::new(Reply::Reject, Reply::Accept)), Arc::new(MockStore::empty()));
    let cookie = session_cookie_header(&live_session());

    let response = send(state, request("GET", "/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn redirect_short_circuits_nested_loader() {
    let store = Arc::new(MockStore::empty());
    let state = test_app_state(Arc::new(MockIdentity::new(Reply::Reject, Reply::Accept)), store.clone());
    let cookie = session_cookie_header(&live_session());

    let response = send(state, request("GET", "/drawings", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(store.tokens.lock().unwrap().is_empty());
}

#[tokio::test]
async fn drawing_detail_is_guarded() {
    let state = test_app_state(Arc::new(MockIdentity::accepting()), Arc::new(MockStore::empty()));

    let response = send(state, request("GET", "/drawing/12", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
