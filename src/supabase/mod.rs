//! Supabase: HTTP client for the hosted auth and data service.
//!
//! DESIGN
//! ======
//! One `SupabaseClient` is built at startup and shared read-only through
//! `AppState`. It speaks to GoTrue (`/auth/v1`) for session refresh and user
//! verification and to PostgREST (`/rest/v1`) for the `materials` table.
//! Callers see it only through the traits in [`types`].

pub mod auth;
pub mod rest;
pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::SupabaseConfig;
pub use types::{IdentityProvider, MaterialStore};
use types::{Fetched, SupabaseError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Build a client from the parsed project config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| SupabaseError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), anon_key: config.anon_key.clone() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the project key and a bearer token.
    fn authorized(&self, builder: reqwest::RequestBuilder, bearer: &str) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    /// Send a request and return the raw body of a success response.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Fetched<String>, SupabaseError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SupabaseError::Request(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| SupabaseError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(SupabaseError::Response { status: status.as_u16(), body: text });
        }

        Ok(Fetched { data: text, headers })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<Fetched<T>, SupabaseError> {
        let Fetched { data, headers } = self.send(builder).await?;
        let data = parse_json(&data)?;
        Ok(Fetched { data, headers })
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, SupabaseError> {
    serde_json::from_str(text).map_err(|e| SupabaseError::Parse(e.to_string()))
}
