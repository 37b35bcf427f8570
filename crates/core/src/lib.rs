//! # Triage Core
//!
//! Core business logic for the triage intake workflow.
//!
//! An intake submission resolves the patient (new or returning), opens an encounter for the visit
//! and records each supplied vital sign against it:
//! - [`patient::PatientResolver`] creates or fetches the patient
//! - [`encounter::EncounterFactory`] persists the encounter
//! - [`vitals::VitalRecorder`] persists one measurement per positive vital value
//! - [`intake::IntakeOrchestrator`] sequences the three
//!
//! Storage is reached only through the collaborator traits in [`repositories`].
//!
//! **No API concerns**: authentication, HTTP servers and request binding belong in `api-rest` and
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod encounter;
pub mod error;
pub mod form;
pub mod intake;
pub mod patient;
pub mod repositories;
pub mod user;
pub mod validation;
pub mod vitals;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use encounter::{Encounter, EncounterFactory, VisitAttributes};
pub use error::{ErrorKind, StoreError, StoreResult, TriageError, TriageResult};
pub use form::{TriageForm, TriageFormService};
pub use intake::{IntakeForm, IntakeOrchestrator, IntakeOutcome};
pub use patient::{Patient, PatientAttributes, PatientResolver, PatientSelection};
pub use repositories::memory::MemoryStore;
pub use repositories::yaml::YamlStore;
pub use repositories::TriageBackend;
pub use user::{ActingUser, CurrentUserProvider};
pub use vitals::{VitalDefinition, VitalKind, VitalReadings, VitalRecorder, VitalWarning};

pub use triage_types::{
    EncounterId, IdError, MeasurementId, NonEmptyText, PatientId, TextError, UserId, VitalId,
};
