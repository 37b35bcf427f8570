//! # API Shared
//!
//! Shared utilities and definitions for the triage APIs.
//!
//! Contains:
//! - Request/response types with OpenAPI schemas (`models` module)
//! - Shared services like `HealthService`
//! - API-key authentication
//!
//! Used by `api-rest`; free of any dependency on `triage-core` so clients can share the wire types.

pub mod auth;
pub mod health;
pub mod models;

pub use auth::AuthError;
pub use health::HealthService;
pub use models::*;
