//! Storage collaborators.
//!
//! The intake workflow talks to storage only through the traits in this module. Two
//! implementations ship with the crate:
//!
//! - [`memory::MemoryStore`] keeps everything in process memory
//! - [`yaml::YamlStore`] writes one YAML file per record under the patient data directory

use crate::encounter::{Encounter, NewEncounter};
use crate::error::StoreResult;
use crate::patient::{NewPatient, Patient};
use crate::vitals::{NewVitalMeasurement, VitalDefinition, VitalMeasurement};
use triage_types::{NonEmptyText, PatientId};

pub mod memory;
pub mod yaml;

/// Read access to existing patients.
pub trait PatientLookup: Send + Sync {
    /// Returns `Ok(None)` when no patient has this identifier.
    fn find_by_id(&self, id: PatientId) -> StoreResult<Option<Patient>>;
}

/// Writes to patient records.
pub trait PatientStore: Send + Sync {
    fn create(&self, patient: NewPatient) -> StoreResult<Patient>;

    /// Replaces the stored `sex` of an existing patient and returns the updated record.
    fn update_sex(&self, id: PatientId, sex: &NonEmptyText) -> StoreResult<Patient>;
}

pub trait EncounterStore: Send + Sync {
    fn create(&self, encounter: NewEncounter) -> StoreResult<Encounter>;
}

/// The catalog of vital-sign definitions.
pub trait VitalCatalog: Send + Sync {
    /// Returns `Ok(None)` when the catalog has no entry named `name`.
    fn find_by_name(&self, name: &str) -> StoreResult<Option<VitalDefinition>>;

    fn find_all(&self) -> StoreResult<Vec<VitalDefinition>>;
}

pub trait VitalStore: Send + Sync {
    fn create(&self, measurement: NewVitalMeasurement) -> StoreResult<VitalMeasurement>;
}

/// A single backend implementing every collaborator the intake workflow needs.
pub trait TriageBackend:
    PatientLookup + PatientStore + EncounterStore + VitalCatalog + VitalStore
{
}

impl<T> TriageBackend for T where
    T: PatientLookup + PatientStore + EncounterStore + VitalCatalog + VitalStore
{
}

/// Sorts catalog entries by display order, then name.
pub(crate) fn sort_catalog(definitions: &mut [VitalDefinition]) {
    definitions.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}
