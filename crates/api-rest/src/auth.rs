//! Request authentication.
//!
//! Every triage endpoint requires the configured API key. The acting user is taken from request
//! headers; identity policy itself is the responsibility of whatever sits in front of this API.

use crate::error::ApiError;
use crate::AppState;
use api_shared::auth::{validate_api_key, API_KEY_HEADER, USER_ID_HEADER, USER_NAME_HEADER};
use api_shared::AuthError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use triage_core::{ActingUser, CurrentUserProvider, NonEmptyText, TriageError, TriageResult, UserId};

/// Reads the acting user from `x-user-id` and `x-user-name`.
pub struct HeaderUserProvider<'a> {
    headers: &'a HeaderMap,
}

impl<'a> HeaderUserProvider<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }

    fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl CurrentUserProvider for HeaderUserProvider<'_> {
    fn current_user(&self) -> TriageResult<ActingUser> {
        let raw = self
            .header(USER_ID_HEADER)
            .ok_or_else(|| TriageError::Unauthenticated(AuthError::MissingUser.to_string()))?;
        let id: UserId = raw.parse().map_err(|e| {
            TriageError::Unauthenticated(AuthError::InvalidUser(format!("{e}")).to_string())
        })?;

        let user = ActingUser::new(id);
        Ok(match NonEmptyText::from_optional(self.header(USER_NAME_HEADER)) {
            Some(name) => user.with_name(name),
            None => user,
        })
    }
}

/// Extractor yielding the authenticated acting user.
pub struct AuthenticatedUser(pub ActingUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        validate_api_key(provided, state.api_key())?;

        let user = HeaderUserProvider::new(&parts.headers).current_user()?;
        Ok(Self(user))
    }
}
