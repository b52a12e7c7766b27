//! GoTrue endpoints: session refresh and user verification.

use time::OffsetDateTime;

use super::SupabaseClient;
use super::types::{IdentityProvider, Session, SupabaseError, User};

#[derive(serde::Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[async_trait::async_trait]
impl IdentityProvider for SupabaseClient {
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshRequest { refresh_token });
        let request = self.authorized(request, &self.anon_key);

        let body = self.send(request).await?.data;
        parse_session(&body, OffsetDateTime::now_utc().unix_timestamp())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, SupabaseError> {
        let request = self.authorized(self.http.get(self.endpoint("/auth/v1/user")), access_token);
        Ok(self.send_json::<User>(request).await?.data)
    }
}

/// Parse a token response, deriving `expires_at` from `expires_in` when the
/// service omits it.
pub(crate) fn parse_session(json: &str, now_unix: i64) -> Result<Session, SupabaseError> {
    let mut session: Session = super::parse_json(json)?;
    if session.expires_at.is_none() {
        session.expires_at = session.expires_in.map(|secs| now_unix.saturating_add(secs));
    }
    Ok(session)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
