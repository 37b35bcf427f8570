//! File-backed storage.
//!
//! ## Storage Layout
//!
//! ```text
//! <patient_data_dir>/
//!   vital_catalog.yaml     # list of vital definitions
//!   patients/<id>.yaml
//!   encounters/<id>.yaml
//!   vitals/<id>.yaml       # one recorded measurement per file
//! ```
//!
//! Identifiers are allocated sequentially: a new record takes the highest numeric file stem in its
//! directory plus one. Allocation and the subsequent write happen under one process-wide lock, so
//! concurrent writers inside a process never collide. Record lookups take the same lock, and every
//! write goes to a `.tmp` sibling that is renamed into place, so a reader never sees a partially
//! written record. Running several processes against the same directory is not supported.

use super::{
    sort_catalog, EncounterStore, PatientLookup, PatientStore, VitalCatalog, VitalStore,
};
use crate::config::CoreConfig;
use crate::constants::RECORD_EXTENSION;
use crate::encounter::{Encounter, NewEncounter};
use crate::error::{StoreError, StoreResult};
use crate::patient::{NewPatient, Patient};
use crate::vitals::{default_catalog, NewVitalMeasurement, VitalDefinition, VitalMeasurement};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use triage_types::{EncounterId, MeasurementId, NonEmptyText, PatientId};

/// YAML-file implementation of every storage collaborator.
#[derive(Debug)]
pub struct YamlStore {
    cfg: Arc<CoreConfig>,
    write_lock: Mutex<()>,
}

impl YamlStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            write_lock: Mutex::new(()),
        }
    }

    /// Writes the default ten-kind catalog if no catalog file exists yet.
    ///
    /// Returns `true` when a catalog was written.
    pub fn seed_catalog(&self) -> StoreResult<bool> {
        let _guard = self.lock()?;
        let path = self.cfg.vital_catalog_path();
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::DirCreation)?;
        }
        let yaml = serde_yaml::to_string(&default_catalog())
            .map_err(StoreError::YamlSerialization)?;
        replace_file(path, &yaml)?;

        tracing::info!("seeded vital catalog at {}", path.display());
        Ok(true)
    }

    /// Lists every stored encounter for `patient_id`, oldest first.
    pub fn encounters_for_patient(&self, patient_id: PatientId) -> StoreResult<Vec<Encounter>> {
        let mut encounters: Vec<Encounter> = read_all(&self.cfg.encounters_dir())?;
        encounters.retain(|e| e.patient_id == patient_id);
        encounters.sort_by_key(|e| e.id);
        Ok(encounters)
    }

    /// Lists every measurement recorded against `encounter_id`.
    pub fn measurements_for_encounter(
        &self,
        encounter_id: EncounterId,
    ) -> StoreResult<Vec<VitalMeasurement>> {
        let mut measurements: Vec<VitalMeasurement> = read_all(&self.cfg.measurements_dir())?;
        measurements.retain(|m| m.encounter_id == encounter_id);
        measurements.sort_by_key(|m| m.id);
        Ok(measurements)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl PatientLookup for YamlStore {
    fn find_by_id(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        let _guard = self.lock()?;
        read_record(&record_path(&self.cfg.patients_dir(), id.get()))
    }
}

impl PatientStore for YamlStore {
    fn create(&self, patient: NewPatient) -> StoreResult<Patient> {
        let _guard = self.lock()?;
        let dir = self.cfg.patients_dir();
        let patient = patient.into_patient(PatientId::new(next_id(&dir)?));
        write_record(&dir, patient.id.get(), &patient)?;
        Ok(patient)
    }

    fn update_sex(&self, id: PatientId, sex: &NonEmptyText) -> StoreResult<Patient> {
        let _guard = self.lock()?;
        let dir = self.cfg.patients_dir();
        let mut patient: Patient = read_record(&record_path(&dir, id.get()))?
            .ok_or_else(|| StoreError::MissingRecord(format!("patient {id}")))?;

        patient.sex = Some(sex.clone());
        write_record(&dir, id.get(), &patient)?;
        Ok(patient)
    }
}

impl EncounterStore for YamlStore {
    fn create(&self, encounter: NewEncounter) -> StoreResult<Encounter> {
        let _guard = self.lock()?;
        let dir = self.cfg.encounters_dir();
        let encounter = encounter.into_encounter(EncounterId::new(next_id(&dir)?));
        write_record(&dir, encounter.id.get(), &encounter)?;
        Ok(encounter)
    }
}

impl VitalCatalog for YamlStore {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<VitalDefinition>> {
        Ok(self
            .find_all()?
            .into_iter()
            .find(|definition| definition.name == name))
    }

    /// A missing catalog file reads as an empty catalog.
    fn find_all(&self) -> StoreResult<Vec<VitalDefinition>> {
        let mut catalog: Vec<VitalDefinition> = {
            let _guard = self.lock()?;
            read_record(self.cfg.vital_catalog_path())?.unwrap_or_default()
        };
        sort_catalog(&mut catalog);
        Ok(catalog)
    }
}

impl VitalStore for YamlStore {
    fn create(&self, measurement: NewVitalMeasurement) -> StoreResult<VitalMeasurement> {
        let _guard = self.lock()?;
        let dir = self.cfg.measurements_dir();
        let measurement = measurement.into_measurement(MeasurementId::new(next_id(&dir)?));
        write_record(&dir, measurement.id.get(), &measurement)?;
        Ok(measurement)
    }
}

fn record_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!("{id}.{RECORD_EXTENSION}"))
}

fn record_id(path: &Path) -> Option<u64> {
    if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

fn next_id(dir: &Path) -> StoreResult<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(StoreError::FileRead(e)),
    };

    let highest = entries
        .flatten()
        .filter_map(|entry| record_id(&entry.path()))
        .max()
        .unwrap_or(0);
    highest
        .checked_add(1)
        .ok_or_else(|| StoreError::IdsExhausted(dir.display().to_string()))
}

fn write_record<T: Serialize>(dir: &Path, id: u64, record: &T) -> StoreResult<()> {
    fs::create_dir_all(dir).map_err(StoreError::DirCreation)?;
    let yaml = serde_yaml::to_string(record).map_err(StoreError::YamlSerialization)?;
    replace_file(&record_path(dir, id), &yaml)
}

/// Writes `contents` next to `path` and renames it over `path`.
fn replace_file(path: &Path, contents: &str) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).map_err(StoreError::FileWrite)?;
    fs::rename(&tmp, path).map_err(StoreError::FileWrite)
}

fn read_record<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::FileRead(e)),
    };

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| StoreError::YamlDeserialization {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads every record file in `dir`, skipping files that fail to parse.
fn read_all<T: DeserializeOwned>(dir: &Path) -> StoreResult<Vec<T>> {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::FileRead(e)),
    };

    let mut records = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if record_id(&path).is_none() {
            continue;
        }
        match read_record(&path) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => tracing::warn!("skipping unreadable record {}: {}", path.display(), e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VITAL_CATALOG_FILENAME;
    use chrono::Utc;
    use tempfile::TempDir;
    use triage_types::{UserId, VitalId};

    fn test_store(dir: &Path) -> YamlStore {
        let cfg = CoreConfig::new(dir.to_path_buf(), None).expect("CoreConfig::new should succeed");
        YamlStore::new(Arc::new(cfg))
    }

    fn new_patient() -> NewPatient {
        NewPatient {
            first_name: NonEmptyText::new("Alice").unwrap(),
            last_name: NonEmptyText::new("Smith").unwrap(),
            birth_date: None,
            sex: None,
            address: Some("1 Main St".into()),
            city: None,
            created_by: UserId::new(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_patient_writes_yaml_and_allocates_ids() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let first = PatientStore::create(&store, new_patient()).expect("create should succeed");
        let second = PatientStore::create(&store, new_patient()).expect("create should succeed");

        assert_eq!(first.id, PatientId::new(1));
        assert_eq!(second.id, PatientId::new(2));
        assert!(temp_dir.path().join("patients").join("2.yaml").is_file());

        let loaded = store
            .find_by_id(PatientId::new(1))
            .expect("lookup should succeed")
            .expect("patient should exist");
        assert_eq!(loaded, first);
    }

    #[test]
    fn find_missing_patient_returns_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert_eq!(store.find_by_id(PatientId::new(3)).unwrap(), None);
    }

    #[test]
    fn update_sex_rewrites_only_that_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let created = PatientStore::create(&store, new_patient()).unwrap();

        let updated = store
            .update_sex(created.id, &NonEmptyText::new("F").unwrap())
            .expect("update should succeed");

        assert_eq!(updated.sex.as_ref().map(NonEmptyText::as_str), Some("F"));
        assert_eq!(updated.address, created.address);
        let reloaded = store.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn corrupt_patient_file_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let dir = temp_dir.path().join("patients");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("5.yaml"), "invalid: yaml: content: [[[").unwrap();

        let err = store
            .find_by_id(PatientId::new(5))
            .expect_err("corrupt file should fail");
        assert!(matches!(err, StoreError::YamlDeserialization { .. }));
    }

    #[test]
    fn lookups_never_see_a_partial_sex_update() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(test_store(temp_dir.path()));
        let created = PatientStore::create(store.as_ref(), new_patient()).unwrap();

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..300 {
                    let sex = if i % 2 == 0 { "F" } else { "M" };
                    store
                        .update_sex(created.id, &NonEmptyText::new(sex).unwrap())
                        .expect("update should succeed");
                }
            })
        };

        while !writer.is_finished() {
            let found = store
                .find_by_id(created.id)
                .expect("lookup during update should succeed");
            assert!(found.is_some());
        }
        writer.join().unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path().join("patients"))
            .unwrap()
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn id_allocation_fails_instead_of_wrapping() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let dir = temp_dir.path().join("patients");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.yaml", u64::MAX)), "stray").unwrap();

        let err = PatientStore::create(&store, new_patient()).expect_err("ids are exhausted");
        assert!(matches!(err, StoreError::IdsExhausted(_)));
    }

    #[test]
    fn catalog_is_empty_until_seeded() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert!(store.find_all().unwrap().is_empty());
        assert!(store.seed_catalog().unwrap());
        assert!(!store.seed_catalog().unwrap(), "second seed is a no-op");
        assert!(temp_dir.path().join(VITAL_CATALOG_FILENAME).is_file());

        let heart_rate = store
            .find_by_name("heartRate")
            .unwrap()
            .expect("heartRate should be seeded");
        assert_eq!(heart_rate.unit_of_measurement, "bpm");
        assert_eq!(store.find_all().unwrap().len(), 10);
    }

    #[test]
    fn encounters_and_measurements_are_listed_by_owner() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let encounter = EncounterStore::create(
            &store,
            NewEncounter {
                patient_id: PatientId::new(4),
                user_id: UserId::new(1),
                date_of_visit: Utc::now(),
                chief_complaint: None,
                weeks_pregnant: None,
            },
        )
        .unwrap();
        VitalStore::create(
            &store,
            NewVitalMeasurement {
                vital_id: VitalId::new(2),
                encounter_id: encounter.id,
                user_id: UserId::new(1),
                value: 72.0,
                date_taken: Utc::now(),
            },
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("vitals").join("notes.txt"),
            "not a record",
        )
        .unwrap();

        assert_eq!(
            store.encounters_for_patient(PatientId::new(4)).unwrap(),
            vec![encounter.clone()]
        );
        assert!(store
            .encounters_for_patient(PatientId::new(5))
            .unwrap()
            .is_empty());
        let measurements = store.measurements_for_encounter(encounter.id).unwrap();
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].value, 72.0);
    }
}
