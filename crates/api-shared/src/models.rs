//! Wire types for the triage APIs.
//!
//! Identifiers travel as plain integers and dates as `YYYY-MM-DD` strings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Intake form submission.
///
/// Every field is optional on the wire. Vital values that are absent, zero or negative are
/// treated as not measured.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IntakeReq {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,

    pub chief_complaint: Option<String>,
    pub weeks_pregnant: Option<u32>,

    pub respiratory_rate: Option<f32>,
    pub heart_rate: Option<f32>,
    pub temperature: Option<f32>,
    pub oxygen_saturation: Option<f32>,
    pub height_feet: Option<f32>,
    pub height_inches: Option<f32>,
    pub weight: Option<f32>,
    pub blood_pressure_systolic: Option<f32>,
    pub blood_pressure_diastolic: Option<f32>,
    pub glucose: Option<f32>,
}

/// A vital that was submitted but not recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalWarningRes {
    /// Catalog name of the vital, e.g. `heartRate`.
    pub vital: String,
    /// `not_found` or `persistence`.
    pub reason: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IntakeRes {
    pub patient_id: u64,
    pub encounter_id: u64,
    /// Where the client should navigate next.
    pub redirect: String,
    pub recorded_vitals: Vec<String>,
    pub warnings: Vec<VitalWarningRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalDefinitionRes {
    pub id: u64,
    pub name: String,
    pub unit_of_measurement: String,
    pub sort_order: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageFormRes {
    pub vitals: Vec<VitalDefinitionRes>,
    pub patient: Option<PatientRes>,
    pub search_error: bool,
}

/// Error body returned with every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub code: String,
    pub message: String,
}
