//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! built once at startup and never mutated: the backend client sits behind
//! `Arc`s and everything request-specific lives in the request context set up
//! by the session hook.

use std::sync::Arc;

use crate::supabase::{IdentityProvider, MaterialStore};

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub materials: Arc<dyn MaterialStore>,
    /// Cookie name the auth session is stored under.
    pub storage_key: String,
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        materials: Arc<dyn MaterialStore>,
        storage_key: String,
        cookie_secure: bool,
    ) -> Self {
        Self { identity, materials, storage_key, cookie_secure }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
