//! Session resolution from auth cookies.
//!
//! ARCHITECTURE
//! ============
//! The auth cookie only proves a prior login. A request counts as
//! authenticated after two steps: the stored session is made current
//! (refreshed through the identity service when its access token is about
//! to expire), and the access token is then verified with `GET /auth/v1/user`.
//! Rejections at either step downgrade to anonymous. Transport faults are
//! surfaced as [`SessionError::Transport`].
//!
//! STORAGE FORMAT
//! ==============
//! The session JSON lives under `sb-<ref>-auth-token`, either whole or split
//! across `sb-<ref>-auth-token.0`, `.1`, ... when it exceeds the chunk size.
//! Values are raw JSON or `base64-` followed by unpadded base64url JSON.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use super::cookies::{CookieAdapter, CookieOptions, CookieToSet, RequestCookie};
use crate::supabase::types::{IdentityProvider, Session, SupabaseError, User};

const BASE64_PREFIX: &str = "base64-";
pub const MAX_CHUNK_SIZE: usize = 3180;
/// Stored sessions this close to expiry are refreshed before use.
pub const EXPIRY_MARGIN_SECS: i64 = 90;
const COOKIE_MAX_AGE_DAYS: i64 = 400;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("identity service unavailable: {0}")]
    Transport(#[source] SupabaseError),
}

/// Result of session resolution: a session together with its verified user,
/// or neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SafeSession {
    session: Option<Session>,
    user: Option<User>,
}

impl SafeSession {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(session: Session, user: User) -> Self {
        Self { session: Some(session), user: Some(user) }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Session and user together, for handlers that act on the user's behalf.
    #[must_use]
    pub fn principal(&self) -> Option<(&Session, &User)> {
        self.session.as_ref().zip(self.user.as_ref())
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve the request's session and verify its user.
///
/// Makes no outbound call when no session cookie is present, and at most two
/// (refresh, then verify) otherwise.
///
/// # Errors
///
/// Returns [`SessionError::Transport`] when the identity service cannot be
/// reached or answers with a server error.
pub async fn safe_get_session(
    identity: &dyn IdentityProvider,
    cookies: &CookieAdapter,
    storage_key: &str,
    cookie_secure: bool,
) -> Result<SafeSession, SessionError> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let Some(session) = current_session(identity, cookies, storage_key, cookie_secure, now).await? else {
        return Ok(SafeSession::anonymous());
    };

    match identity.get_user(&session.access_token).await {
        Ok(user) => Ok(SafeSession::authenticated(session, user)),
        Err(e) if e.is_rejection() => {
            tracing::debug!(error = %e, "access token rejected by identity service");
            Ok(SafeSession::anonymous())
        }
        Err(e) => Err(SessionError::Transport(e)),
    }
}

/// Stored session, refreshed first when it is about to expire.
async fn current_session(
    identity: &dyn IdentityProvider,
    cookies: &CookieAdapter,
    storage_key: &str,
    cookie_secure: bool,
    now: i64,
) -> Result<Option<Session>, SessionError> {
    let incoming = cookies.get_all();
    let Some(stored) = read_stored_session(&incoming, storage_key) else {
        return Ok(None);
    };

    if !stored.expires_within(now, EXPIRY_MARGIN_SECS) {
        return Ok(Some(stored));
    }

    match identity.refresh_session(&stored.refresh_token).await {
        Ok(fresh) => {
            cookies.set_all(session_cookies(storage_key, &fresh, &incoming, cookie_secure));
            Ok(Some(fresh))
        }
        Err(e) if e.is_rejection() => {
            tracing::debug!(error = %e, "session refresh rejected; clearing auth cookies");
            cookies.set_all(removal_cookies(storage_key, &incoming, cookie_secure));
            Ok(None)
        }
        Err(e) => Err(SessionError::Transport(e)),
    }
}

// =============================================================================
// COOKIE STORAGE
// =============================================================================

/// Decode the session stored under `storage_key`, whole or chunked.
#[must_use]
pub fn read_stored_session(cookies: &[RequestCookie], storage_key: &str) -> Option<Session> {
    let raw = combine_chunks(cookies, storage_key)?;
    decode_session(&raw)
}

fn find<'a>(cookies: &'a [RequestCookie], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.value.as_str())
}

/// Whole cookie if present, else `key.0`, `key.1`, ... up to the first gap.
pub(crate) fn combine_chunks(cookies: &[RequestCookie], storage_key: &str) -> Option<String> {
    if let Some(value) = find(cookies, storage_key) {
        return Some(value.to_owned());
    }

    let mut combined = String::new();
    for index in 0.. {
        let Some(chunk) = find(cookies, &chunk_name(storage_key, index)) else {
            break;
        };
        combined.push_str(chunk);
    }

    (!combined.is_empty()).then_some(combined)
}

fn chunk_name(storage_key: &str, index: usize) -> String {
    format!("{storage_key}.{index}")
}

pub(crate) fn decode_session(raw: &str) -> Option<Session> {
    let json = match raw.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD
                .decode(encoded.trim_end_matches('='))
                .ok()?;
            String::from_utf8(bytes).ok()?
        }
        None => raw.to_owned(),
    };
    serde_json::from_str(&json).ok()
}

pub(crate) fn encode_session(session: &Session) -> String {
    // Serializing a struct of strings and numbers cannot fail.
    let json = serde_json::to_string(session).unwrap_or_default();
    format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json))
}

fn write_options(cookie_secure: bool, max_age: Duration) -> CookieOptions {
    CookieOptions { max_age: Some(max_age), secure: cookie_secure, ..CookieOptions::default() }
}

/// Names of auth cookies the client currently holds (whole or chunks).
fn existing_auth_cookies<'a>(cookies: &'a [RequestCookie], storage_key: &str) -> Vec<&'a str> {
    cookies
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| {
            *name == storage_key
                || name
                    .strip_prefix(storage_key)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|idx| !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()))
        })
        .collect()
}

/// Cookies persisting `session`, chunked when large, plus removals for any
/// stale auth cookies the new layout no longer uses.
#[must_use]
pub fn session_cookies(
    storage_key: &str,
    session: &Session,
    existing: &[RequestCookie],
    cookie_secure: bool,
) -> Vec<CookieToSet> {
    let encoded = encode_session(session);
    let options = write_options(cookie_secure, Duration::days(COOKIE_MAX_AGE_DAYS));

    let mut writes: Vec<CookieToSet> = if encoded.len() <= MAX_CHUNK_SIZE {
        vec![CookieToSet { name: storage_key.to_owned(), value: encoded, options: options.clone() }]
    } else {
        // Base64url output is ASCII, so byte chunks are valid str slices.
        encoded
            .as_bytes()
            .chunks(MAX_CHUNK_SIZE)
            .enumerate()
            .map(|(index, chunk)| CookieToSet {
                name: chunk_name(storage_key, index),
                value: String::from_utf8_lossy(chunk).into_owned(),
                options: options.clone(),
            })
            .collect()
    };

    let stale: Vec<CookieToSet> = existing_auth_cookies(existing, storage_key)
        .into_iter()
        .filter(|name| !writes.iter().any(|w| w.name == *name))
        .map(|name| removal(name, cookie_secure))
        .collect();
    writes.extend(stale);
    writes
}

/// Expire every auth cookie the client holds.
#[must_use]
pub fn removal_cookies(storage_key: &str, existing: &[RequestCookie], cookie_secure: bool) -> Vec<CookieToSet> {
    existing_auth_cookies(existing, storage_key)
        .into_iter()
        .map(|name| removal(name, cookie_secure))
        .collect()
}

fn removal(name: &str, cookie_secure: bool) -> CookieToSet {
    CookieToSet { name: name.to_owned(), value: String::new(), options: write_options(cookie_secure, Duration::ZERO) }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
