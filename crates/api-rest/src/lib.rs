//! # API REST
//!
//! REST API implementation for the triage workflow.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, API-key authentication)
//!
//! Uses `api-shared` for wire types and `triage-core` for every business decision.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use triage_core::{IntakeOrchestrator, TriageBackend, TriageFormService};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    orchestrator: IntakeOrchestrator,
    forms: TriageFormService,
    api_key: Arc<str>,
}

impl AppState {
    /// Wires the intake services to `backend`. `api_key` is the key every triage request must
    /// present in `x-api-key`.
    pub fn new<B: TriageBackend + 'static>(backend: Arc<B>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            orchestrator: IntakeOrchestrator::from_backend(backend.clone()),
            forms: TriageFormService::new(backend.clone(), backend),
            api_key: api_key.into(),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::blank_form,
        handlers::populated_form,
        handlers::intake_new_patient,
        handlers::intake_existing_patient,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::IntakeReq,
        api_shared::IntakeRes,
        api_shared::VitalWarningRes,
        api_shared::VitalDefinitionRes,
        api_shared::PatientRes,
        api_shared::TriageFormRes,
        api_shared::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/triage",
            get(handlers::blank_form).post(handlers::intake_new_patient),
        )
        .route("/triage/populated", get(handlers::populated_form))
        .route("/triage/:id", post(handlers::intake_existing_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
