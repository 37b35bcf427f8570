//! In-process storage.

use super::{
    sort_catalog, EncounterStore, PatientLookup, PatientStore, VitalCatalog, VitalStore,
};
use crate::encounter::{Encounter, NewEncounter};
use crate::error::{StoreError, StoreResult};
use crate::patient::{NewPatient, Patient};
use crate::vitals::{default_catalog, NewVitalMeasurement, VitalDefinition, VitalMeasurement};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use triage_types::{EncounterId, MeasurementId, NonEmptyText, PatientId};

#[derive(Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    encounters: Vec<Encounter>,
    measurements: Vec<VitalMeasurement>,
    catalog: Vec<VitalDefinition>,
}

/// Thread-safe in-memory implementation of every storage collaborator.
///
/// Identifiers are allocated sequentially starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new(mut catalog: Vec<VitalDefinition>) -> Self {
        sort_catalog(&mut catalog);
        Self {
            tables: Mutex::new(Tables {
                catalog,
                ..Tables::default()
            }),
        }
    }

    pub fn with_default_catalog() -> Self {
        Self::new(default_catalog())
    }

    /// Inserts an already-identified patient, replacing any patient with the same id.
    pub fn insert_patient(&self, patient: Patient) -> StoreResult<()> {
        self.lock()?.patients.insert(patient.id, patient);
        Ok(())
    }

    pub fn patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.lock()?.patients.values().cloned().collect())
    }

    pub fn encounters(&self) -> StoreResult<Vec<Encounter>> {
        Ok(self.lock()?.encounters.clone())
    }

    pub fn measurements(&self) -> StoreResult<Vec<VitalMeasurement>> {
        Ok(self.lock()?.measurements.clone())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl PatientLookup for MemoryStore {
    fn find_by_id(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.lock()?.patients.get(&id).cloned())
    }
}

impl PatientStore for MemoryStore {
    fn create(&self, patient: NewPatient) -> StoreResult<Patient> {
        let mut tables = self.lock()?;
        let next = match tables.patients.keys().next_back() {
            Some(last) => last
                .get()
                .checked_add(1)
                .ok_or_else(|| StoreError::IdsExhausted("patients".into()))?,
            None => 1,
        };
        let patient = patient.into_patient(PatientId::new(next));
        tables.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    fn update_sex(&self, id: PatientId, sex: &NonEmptyText) -> StoreResult<Patient> {
        let mut tables = self.lock()?;
        let patient = tables
            .patients
            .get_mut(&id)
            .ok_or_else(|| StoreError::MissingRecord(format!("patient {id}")))?;
        patient.sex = Some(sex.clone());
        Ok(patient.clone())
    }
}

impl EncounterStore for MemoryStore {
    fn create(&self, encounter: NewEncounter) -> StoreResult<Encounter> {
        let mut tables = self.lock()?;
        let id = EncounterId::new(tables.encounters.len() as u64 + 1);
        let encounter = encounter.into_encounter(id);
        tables.encounters.push(encounter.clone());
        Ok(encounter)
    }
}

impl VitalCatalog for MemoryStore {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<VitalDefinition>> {
        Ok(self
            .lock()?
            .catalog
            .iter()
            .find(|definition| definition.name == name)
            .cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<VitalDefinition>> {
        Ok(self.lock()?.catalog.clone())
    }
}

impl VitalStore for MemoryStore {
    fn create(&self, measurement: NewVitalMeasurement) -> StoreResult<VitalMeasurement> {
        let mut tables = self.lock()?;
        let id = MeasurementId::new(tables.measurements.len() as u64 + 1);
        let measurement = measurement.into_measurement(id);
        tables.measurements.push(measurement.clone());
        Ok(measurement)
    }
}
