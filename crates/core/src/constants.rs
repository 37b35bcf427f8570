//! Constants used throughout the triage core crate.
//!
//! Storage directory and file names live here so the YAML store, the configuration layer and the
//! binaries agree on one layout.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name for patient records.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Directory name for encounter records.
pub const ENCOUNTERS_DIR_NAME: &str = "encounters";

/// Directory name for recorded vital measurements.
pub const MEASUREMENTS_DIR_NAME: &str = "vitals";

/// Filename for the vital-sign catalog.
pub const VITAL_CATALOG_FILENAME: &str = "vital_catalog.yaml";

/// File extension for individual record files.
pub const RECORD_EXTENSION: &str = "yaml";

/// Path prefix of the patient view the caller navigates to after an intake.
pub const PATIENT_VIEW_PATH: &str = "/show";
