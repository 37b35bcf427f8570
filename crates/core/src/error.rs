use std::path::PathBuf;
use triage_types::{IdError, PatientId, TextError};

/// Failure reported by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create storage directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML (path: {path}): {source}", path = path.display())]
    YamlDeserialization {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("record does not exist: {0}")]
    MissingRecord(String),
    #[error("no identifiers left in {0}")]
    IdsExhausted(String),
    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Coarse classification of a [`TriageError`], used by callers to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unparseable input.
    Validation,
    /// A referenced patient or vital definition does not exist.
    NotFound,
    /// A store read, write, or update failed.
    Persistence,
    /// No acting user could be established.
    Unauthenticated,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),
    #[error("invalid identifier: {0}")]
    Id(#[from] IdError),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("vital `{0}` not found in catalog")]
    VitalNotFound(String),

    #[error("failed to {action}: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("no authenticated user: {0}")]
    Unauthenticated(String),
}

impl TriageError {
    /// Returns a mapper that wraps a [`StoreError`] with the action that failed.
    pub fn persistence(action: &'static str) -> impl FnOnce(StoreError) -> TriageError {
        move |source| TriageError::Persistence { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TriageError::InvalidInput(_) | TriageError::Text(_) | TriageError::Id(_) => {
                ErrorKind::Validation
            }
            TriageError::PatientNotFound(_) | TriageError::VitalNotFound(_) => ErrorKind::NotFound,
            TriageError::Persistence { .. } => ErrorKind::Persistence,
            TriageError::Unauthenticated(_) => ErrorKind::Unauthenticated,
        }
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
