//! Recording test double with switchable failures.

use crate::encounter::{Encounter, NewEncounter};
use crate::error::{StoreError, StoreResult};
use crate::patient::{NewPatient, Patient};
use crate::repositories::memory::MemoryStore;
use crate::repositories::{EncounterStore, PatientLookup, PatientStore, VitalCatalog, VitalStore};
use crate::vitals::{
    default_catalog, NewVitalMeasurement, VitalDefinition, VitalKind, VitalMeasurement,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use triage_types::{NonEmptyText, PatientId, UserId};

pub(crate) struct RecordingStore {
    inner: MemoryStore,
    patient_creates: AtomicUsize,
    encounter_creates: AtomicUsize,
    sex_updates: Mutex<Vec<(PatientId, String)>>,
    fail_patient_create: AtomicBool,
    fail_sex_update: AtomicBool,
    fail_encounter_create: AtomicBool,
    fail_catalog_reads: AtomicBool,
    failing_vitals: Mutex<HashSet<&'static str>>,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::with_catalog(default_catalog())
    }
}

impl RecordingStore {
    pub(crate) fn with_catalog(catalog: Vec<VitalDefinition>) -> Self {
        Self {
            inner: MemoryStore::new(catalog),
            patient_creates: AtomicUsize::new(0),
            encounter_creates: AtomicUsize::new(0),
            sex_updates: Mutex::new(Vec::new()),
            fail_patient_create: AtomicBool::new(false),
            fail_sex_update: AtomicBool::new(false),
            fail_encounter_create: AtomicBool::new(false),
            fail_catalog_reads: AtomicBool::new(false),
            failing_vitals: Mutex::new(HashSet::new()),
        }
    }

    /// A store whose catalog lacks `missing`.
    pub(crate) fn without_vital(missing: VitalKind) -> Self {
        let catalog = default_catalog()
            .into_iter()
            .filter(|d| d.name != missing.name())
            .collect();
        Self::with_catalog(catalog)
    }

    pub(crate) fn seed_patient(&self, id: u64) -> Patient {
        let patient = Patient {
            id: PatientId::new(id),
            first_name: NonEmptyText::new("Existing").unwrap(),
            last_name: NonEmptyText::new("Patient").unwrap(),
            birth_date: None,
            sex: Some(NonEmptyText::new("M").unwrap()),
            address: None,
            city: None,
            created_by: UserId::new(99),
            created_at: Utc::now(),
        };
        self.inner.insert_patient(patient.clone()).unwrap();
        patient
    }

    pub(crate) fn fail_patient_create(&self) {
        self.fail_patient_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_sex_update(&self) {
        self.fail_sex_update.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_encounter_create(&self) {
        self.fail_encounter_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_catalog_reads(&self) {
        self.fail_catalog_reads.store(true, Ordering::SeqCst);
    }

    /// Makes measurement writes for `kind` fail.
    pub(crate) fn fail_measurement(&self, kind: VitalKind) {
        self.failing_vitals.lock().unwrap().insert(kind.name());
    }

    pub(crate) fn patient_creates(&self) -> usize {
        self.patient_creates.load(Ordering::SeqCst)
    }

    pub(crate) fn encounter_creates(&self) -> usize {
        self.encounter_creates.load(Ordering::SeqCst)
    }

    pub(crate) fn sex_updates(&self) -> Vec<(PatientId, String)> {
        self.sex_updates.lock().unwrap().clone()
    }

    pub(crate) fn patients(&self) -> Vec<Patient> {
        self.inner.patients().unwrap()
    }

    pub(crate) fn encounters(&self) -> Vec<Encounter> {
        self.inner.encounters().unwrap()
    }

    pub(crate) fn measurements(&self) -> Vec<VitalMeasurement> {
        self.inner.measurements().unwrap()
    }

    /// Catalog names of every recorded measurement, in recording order.
    pub(crate) fn measured_names(&self) -> Vec<String> {
        let catalog = self.inner.find_all().unwrap();
        self.measurements()
            .iter()
            .filter_map(|m| catalog.iter().find(|d| d.id == m.vital_id))
            .map(|d| d.name.clone())
            .collect()
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Unavailable(format!("injected {what} failure"))
    }
}

impl PatientLookup for RecordingStore {
    fn find_by_id(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        self.inner.find_by_id(id)
    }
}

impl PatientStore for RecordingStore {
    fn create(&self, patient: NewPatient) -> StoreResult<Patient> {
        self.patient_creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_patient_create.load(Ordering::SeqCst) {
            return Err(Self::injected("patient create"));
        }
        PatientStore::create(&self.inner, patient)
    }

    fn update_sex(&self, id: PatientId, sex: &NonEmptyText) -> StoreResult<Patient> {
        self.sex_updates
            .lock()
            .unwrap()
            .push((id, sex.as_str().to_string()));
        if self.fail_sex_update.load(Ordering::SeqCst) {
            return Err(Self::injected("sex update"));
        }
        self.inner.update_sex(id, sex)
    }
}

impl EncounterStore for RecordingStore {
    fn create(&self, encounter: NewEncounter) -> StoreResult<Encounter> {
        self.encounter_creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_encounter_create.load(Ordering::SeqCst) {
            return Err(Self::injected("encounter create"));
        }
        EncounterStore::create(&self.inner, encounter)
    }
}

impl VitalCatalog for RecordingStore {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<VitalDefinition>> {
        if self.fail_catalog_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("catalog read"));
        }
        self.inner.find_by_name(name)
    }

    fn find_all(&self) -> StoreResult<Vec<VitalDefinition>> {
        if self.fail_catalog_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("catalog read"));
        }
        self.inner.find_all()
    }
}

impl VitalStore for RecordingStore {
    fn create(&self, measurement: NewVitalMeasurement) -> StoreResult<VitalMeasurement> {
        let name = self
            .inner
            .find_all()?
            .into_iter()
            .find(|d| d.id == measurement.vital_id)
            .map(|d| d.name);
        let failing = self.failing_vitals.lock().unwrap();
        if name.is_some_and(|n| failing.contains(n.as_str())) {
            return Err(Self::injected("measurement create"));
        }
        drop(failing);
        VitalStore::create(&self.inner, measurement)
    }
}
