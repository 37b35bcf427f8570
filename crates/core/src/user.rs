//! The authenticated user on whose behalf an intake is recorded.

use crate::TriageResult;
use triage_types::{NonEmptyText, UserId};

/// The clinician submitting an intake.
///
/// Passed explicitly into every operation that records who did what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActingUser {
    pub id: UserId,
    pub name: Option<NonEmptyText>,
}

impl ActingUser {
    pub fn new(id: UserId) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(mut self, name: NonEmptyText) -> Self {
        self.name = Some(name);
        self
    }
}

/// Supplies the acting user for the current request or session.
pub trait CurrentUserProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `TriageError::Unauthenticated` when no user can be established.
    fn current_user(&self) -> TriageResult<ActingUser>;
}

/// A fixed user is its own provider (CLI sessions, tests).
impl CurrentUserProvider for ActingUser {
    fn current_user(&self) -> TriageResult<ActingUser> {
        Ok(self.clone())
    }
}
