//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session resolution, cookie storage, and the material
//! view model so route handlers can stay focused on request plumbing and
//! redirect policy.

pub mod columns;
pub mod cookies;
pub mod material;
pub mod session;
