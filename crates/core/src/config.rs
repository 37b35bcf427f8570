//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables.

use crate::constants::{
    DEFAULT_PATIENT_DATA_DIR, ENCOUNTERS_DIR_NAME, MEASUREMENTS_DIR_NAME, PATIENTS_DIR_NAME,
    VITAL_CATALOG_FILENAME,
};
use crate::{TriageError, TriageResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    vital_catalog_path: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// When `vital_catalog_override` is `None` the catalog is read from
    /// `<patient_data_dir>/vital_catalog.yaml`.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if `patient_data_dir` is empty, or if the override does
    /// not point at an existing file.
    pub fn new(
        patient_data_dir: PathBuf,
        vital_catalog_override: Option<PathBuf>,
    ) -> TriageResult<Self> {
        if patient_data_dir.as_os_str().is_empty() {
            return Err(TriageError::InvalidInput(
                "patient_data_dir cannot be empty".into(),
            ));
        }

        let vital_catalog_path = match vital_catalog_override {
            Some(path) if path.is_file() => path,
            Some(path) => {
                return Err(TriageError::InvalidInput(format!(
                    "vital catalog override is not a file: {}",
                    path.display()
                )))
            }
            None => patient_data_dir.join(VITAL_CATALOG_FILENAME),
        };

        Ok(Self {
            patient_data_dir,
            vital_catalog_path,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn encounters_dir(&self) -> PathBuf {
        self.patient_data_dir.join(ENCOUNTERS_DIR_NAME)
    }

    pub fn measurements_dir(&self) -> PathBuf {
        self.patient_data_dir.join(MEASUREMENTS_DIR_NAME)
    }

    pub fn vital_catalog_path(&self) -> &Path {
        &self.vital_catalog_path
    }
}

/// Resolve the patient data directory from an optional environment value.
///
/// Empty or whitespace values fall back to [`DEFAULT_PATIENT_DATA_DIR`].
pub fn patient_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_DIR))
}

/// Parse an optional vital catalog path override.
pub fn vital_catalog_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
