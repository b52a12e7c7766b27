//! Request hook: per-request session context and response header policy.
//!
//! Every request passes through [`session_context`] first. It installs a
//! [`RequestContext`] (cookie adapter plus memoised session resolution) in
//! the request extensions, runs the rest of the stack, then writes any cookies
//! queued during the request and forwards the allowed upstream headers.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tokio::sync::OnceCell;

use crate::services::cookies::CookieAdapter;
use crate::services::session::{self, SafeSession, SessionError};
use crate::state::AppState;

/// Upstream response headers that may reach the client.
pub const SERIALIZED_HEADERS: [&str; 2] = ["content-range", "x-supabase-api-version"];

/// Response extension carrying headers from a backend call made by a loader.
#[derive(Debug, Clone, Default)]
pub struct UpstreamHeaders(pub HeaderMap);

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

pub struct RequestContext {
    cookies: CookieAdapter,
    resolved: OnceCell<SafeSession>,
}

impl RequestContext {
    #[must_use]
    pub fn new(cookies: CookieAdapter) -> Self {
        Self { cookies, resolved: OnceCell::new() }
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieAdapter {
        &self.cookies
    }

    /// Resolve the session once per request; later calls reuse the result.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the identity service.
    pub async fn safe_get_session(&self, state: &AppState) -> Result<&SafeSession, SessionError> {
        self.resolved
            .get_or_try_init(|| {
                session::safe_get_session(
                    state.identity.as_ref(),
                    &self.cookies,
                    &state.storage_key,
                    state.cookie_secure,
                )
            })
            .await
    }
}

/// Handler access to the request context installed by [`session_context`].
pub struct Locals(pub Arc<RequestContext>);

impl<S> FromRequestParts<S> for Locals
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<RequestContext>>()
            .cloned()
            .map(Self)
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) fn session_error_to_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Log a resolution failure and turn it into a response.
pub(crate) fn session_failure(err: SessionError) -> Response {
    tracing::error!(error = %err, "session resolution failed");
    (session_error_to_status(&err), "Identity service unavailable").into_response()
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

pub async fn session_context(mut req: Request, next: Next) -> Response {
    let ctx = Arc::new(RequestContext::new(CookieAdapter::from_headers(req.headers())));
    req.extensions_mut().insert(Arc::clone(&ctx));

    let mut response = next.run(req).await;

    if let Some(UpstreamHeaders(upstream)) = response.extensions_mut().remove::<UpstreamHeaders>() {
        response
            .headers_mut()
            .extend(filter_serialized_headers(&upstream));
    }

    let outgoing = ctx.cookies().take_outgoing();
    if outgoing.is_empty() {
        return response;
    }
    let jar = outgoing
        .into_iter()
        .fold(CookieJar::new(), CookieJar::add);
    (jar, response).into_response()
}

/// Keep only the upstream headers allowed through to the client.
#[must_use]
pub fn filter_serialized_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut allowed = HeaderMap::new();
    for name in SERIALIZED_HEADERS {
        let name = HeaderName::from_static(name);
        for value in upstream.get_all(&name) {
            allowed.append(name.clone(), value.clone());
        }
    }
    allowed
}

#[cfg(test)]
#[path = "hooks_test.rs"]
mod tests;
