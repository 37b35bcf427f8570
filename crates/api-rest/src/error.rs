//! API errors with structured JSON responses.

use api_shared::{AuthError, ErrorRes};
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use triage_core::{ErrorKind, TriageError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Triage(#[from] TriageError),
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON request body whose rejections are reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(e) => (StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", e.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string()),
            ApiError::Triage(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                ErrorKind::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", e.to_string())
                }
                ErrorKind::Persistence => {
                    tracing::error!("triage persistence error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorRes {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
