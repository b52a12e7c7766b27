//! Request-scoped cookie adapter handed to session resolution.
//!
//! Reads are served verbatim from the incoming `Cookie` headers. Writes are
//! queued and flushed as `Set-Cookie` by the request hook once the handler
//! has produced a response, always scoped to path `/`.

use std::sync::Mutex;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;
use time::Duration;

/// One incoming cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

/// Attributes for a cookie to persist. The path is not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Option<Duration>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self { max_age: None, http_only: false, secure: false, same_site: SameSite::Lax }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieToSet {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

pub struct CookieAdapter {
    incoming: Vec<RequestCookie>,
    outgoing: Mutex<Vec<Cookie<'static>>>,
}

impl CookieAdapter {
    #[must_use]
    pub fn new(incoming: Vec<RequestCookie>) -> Self {
        Self { incoming, outgoing: Mutex::new(Vec::new()) }
    }

    /// Collect cookies from every `Cookie` header, in header order.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();
        Self::new(incoming)
    }

    /// The incoming cookies exactly as the client sent them.
    #[must_use]
    pub fn get_all(&self) -> Vec<RequestCookie> {
        self.incoming.clone()
    }

    /// Queue cookies for the response. Every cookie is rewritten to path `/`.
    pub fn set_all(&self, cookies: Vec<CookieToSet>) {
        let mut outgoing = self
            .outgoing
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        outgoing.extend(cookies.into_iter().map(build_cookie));
    }

    /// Drain the queued cookies.
    pub fn take_outgoing(&self) -> Vec<Cookie<'static>> {
        let mut outgoing = self
            .outgoing
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *outgoing)
    }
}

fn build_cookie(cookie: CookieToSet) -> Cookie<'static> {
    let CookieToSet { name, value, options } = cookie;
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(options.http_only)
        .secure(options.secure)
        .same_site(options.same_site);
    if let Some(max_age) = options.max_age {
        builder = builder.max_age(max_age);
    }
    builder.build()
}

/// Split one `Cookie` header into percent-decoded name/value pairs, skipping
/// malformed parts.
pub(crate) fn parse_cookie_header(header: &str) -> Vec<RequestCookie> {
    Cookie::split_parse_encoded(header.to_owned())
        .filter_map(Result::ok)
        .map(|c| RequestCookie { name: c.name().to_owned(), value: c.value().to_owned() })
        .collect()
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
