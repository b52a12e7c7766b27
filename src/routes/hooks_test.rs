use super::*;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use std::sync::Arc;

use crate::state::test_helpers::{
    MockIdentity, MockStore, Reply, STORAGE_KEY, expired_session, request, send, session_cookie_header, test_app_state,
};

// =============================================================================
// filter_serialized_headers
// =============================================================================

#[test]
fn only_pagination_and_api_version_pass_through() {
    let mut upstream = HeaderMap::new();
    upstream.insert("content-range", HeaderValue::from_static("0-9/42"));
    upstream.insert("x-supabase-api-version", HeaderValue::from_static("2024-01-01"));
    upstream.insert("x-other", HeaderValue::from_static("secret"));

    let allowed = filter_serialized_headers(&upstream);
    assert_eq!(allowed.len(), 2);
    assert_eq!(allowed.get("content-range").unwrap(), "0-9/42");
    assert_eq!(allowed.get("x-supabase-api-version").unwrap(), "2024-01-01");
    assert!(allowed.get("x-other").is_none());
}

#[test]
fn filter_of_empty_map_is_empty() {
    assert!(filter_serialized_headers(&HeaderMap::new()).is_empty());
}

#[test]
fn filter_drops_common_upstream_headers() {
    let mut upstream = HeaderMap::new();
    upstream.insert("content-type", HeaderValue::from_static("application/json"));
    upstream.insert("set-cookie", HeaderValue::from_static("a=b"));
    upstream.insert("sb-gateway-version", HeaderValue::from_static("1"));
    assert!(filter_serialized_headers(&upstream).is_empty());
}

// =============================================================================
// session_error_to_status
// =============================================================================

#[test]
fn transport_failure_maps_to_bad_gateway() {
    let err = SessionError::Transport(crate::supabase::types::SupabaseError::Request("timeout".into()));
    assert_eq!(session_error_to_status(&err), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// session_context
// =============================================================================

#[tokio::test]
async fn refreshed_session_is_written_back_as_root_scoped_cookie() {
    let identity = Arc::new(MockIdentity::accepting());
    let state = test_app_state(identity.clone(), Arc::new(MockStore::empty()));
    let cookie = session_cookie_header(&expired_session());

    let response = send(state, request("GET", "/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie: Vec<_> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert_eq!(set_cookie.len(), 1);
    assert!(set_cookie[0].starts_with(&format!("{STORAGE_KEY}=base64-")));
    assert!(set_cookie[0].contains("Path=/"));
}

#[tokio::test]
async fn no_set_cookie_without_session_changes() {
    let state = test_app_state(Arc::new(MockIdentity::accepting()), Arc::new(MockStore::empty()));
    let response = send(state, request("GET", "/", Some("theme=dark"))).await;
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn session_resolves_once_per_request() {
    let identity = Arc::new(MockIdentity::accepting());
    let state = test_app_state(identity.clone(), Arc::new(MockStore::empty()));
    let cookie = session_cookie_header(&crate::state::test_helpers::live_session());

    // Guard and loader both read the session.
    let response = send(state, request("GET", "/drawings", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(identity.outbound_calls(), 1);
}

#[tokio::test]
async fn unreachable_identity_service_is_bad_gateway() {
    let identity = Arc::new(MockIdentity::new(Reply::Unreachable, Reply::Accept));
    let state = test_app_state(identity, Arc::new(MockStore::empty()));
    let cookie = session_cookie_header(&crate::state::test_helpers::live_session());

    let response = send(state, request("GET", "/home", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
