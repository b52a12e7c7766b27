//! Supabase types: wire records, errors, and the service traits.
//!
//! Route and service code only talks to the hosted backend through the
//! [`IdentityProvider`] and [`MaterialStore`] traits so tests can swap in
//! in-memory doubles.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by calls to the hosted backend.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success HTTP status.
    #[error("response error: status {status}: {body}")]
    Response { status: u16, body: String },

    /// A success response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl SupabaseError {
    /// True when the service looked at the request and refused it (bad,
    /// expired, or revoked token). Anything else is a transport fault.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Response { status: 400..=499, .. })
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Token bundle issued by the identity service and stored in cookies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// User payload as embedded by the identity service. Kept for round-trips
    /// only; identity is always taken from [`IdentityProvider::get_user`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl Session {
    /// Whether the access token expires within `margin_secs` of `now_unix`.
    /// Sessions without an expiry never count as expired.
    #[must_use]
    pub fn expires_within(&self, now_unix: i64, margin_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|exp| exp.saturating_sub(now_unix) < margin_secs)
    }
}

/// Verified identity returned by `GET /auth/v1/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// MATERIALS
// =============================================================================

/// Embedded `profiles(email)` relation on a material row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    #[serde(default)]
    pub email: Option<String>,
}

/// Row of the `materials` table as returned by PostgREST with
/// `select=*,profile:profiles(email)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub profile: Option<ProfileRef>,
}

/// Insert payload for a new material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMaterial {
    pub title: String,
    pub is_active: bool,
    pub created_by: Uuid,
}

impl NewMaterial {
    pub const DEFAULT_TITLE: &'static str = "Untitled Material";

    #[must_use]
    pub fn untitled(created_by: Uuid) -> Self {
        Self { title: Self::DEFAULT_TITLE.to_owned(), is_active: true, created_by }
    }
}

/// Payload plus the upstream response headers it arrived with.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub data: T,
    pub headers: HeaderMap,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Identity service operations used by session resolution.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError>;

    /// Authoritatively verify an access token and return its user.
    async fn get_user(&self, access_token: &str) -> Result<User, SupabaseError>;
}

/// Row access to the `materials` table on behalf of a signed-in user.
#[async_trait::async_trait]
pub trait MaterialStore: Send + Sync {
    /// All materials with their creator email, newest first.
    async fn list_materials(&self, access_token: &str) -> Result<Fetched<Vec<MaterialRow>>, SupabaseError>;

    async fn insert_material(&self, access_token: &str, material: &NewMaterial) -> Result<MaterialRow, SupabaseError>;

    async fn delete_material(&self, access_token: &str, id: i64) -> Result<(), SupabaseError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
