//! API-key authentication.

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the acting user's numeric identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the acting user's display name (optional).
pub const USER_NAME_HEADER: &str = "x-user-name";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing x-api-key header")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Missing x-user-id header")]
    MissingUser,
    #[error("Invalid x-user-id header: {0}")]
    InvalidUser(String),
}

/// Validates the provided API key against the key configured at startup.
///
/// The comparison does not short-circuit on the first differing byte.
pub fn validate_api_key(provided: Option<&str>, expected: &str) -> Result<(), AuthError> {
    let provided = provided.ok_or(AuthError::MissingApiKey)?;

    let same_len = provided.len() == expected.len();
    let diff = provided
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    if same_len && diff == 0 {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey)
    }
}
