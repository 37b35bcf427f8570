//! Vital-sign kinds, catalog entries and measurement recording.
//!
//! The ten recognised kinds live in one ordered table ([`VitalKind::ALL`]). Intake code iterates
//! that table instead of naming each field, so adding a kind means adding one variant here.

use crate::error::{TriageError, TriageResult};
use crate::repositories::{VitalCatalog, VitalStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use triage_types::{EncounterId, MeasurementId, UserId, VitalId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VitalKind {
    RespiratoryRate,
    HeartRate,
    Temperature,
    OxygenSaturation,
    HeightFeet,
    HeightInches,
    Weight,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Glucose,
}

impl VitalKind {
    /// Every kind in intake order.
    pub const ALL: [VitalKind; 10] = [
        VitalKind::RespiratoryRate,
        VitalKind::HeartRate,
        VitalKind::Temperature,
        VitalKind::OxygenSaturation,
        VitalKind::HeightFeet,
        VitalKind::HeightInches,
        VitalKind::Weight,
        VitalKind::BloodPressureSystolic,
        VitalKind::BloodPressureDiastolic,
        VitalKind::Glucose,
    ];

    /// Canonical catalog name.
    pub fn name(self) -> &'static str {
        match self {
            VitalKind::RespiratoryRate => "respiratoryRate",
            VitalKind::HeartRate => "heartRate",
            VitalKind::Temperature => "temperature",
            VitalKind::OxygenSaturation => "oxygenSaturation",
            VitalKind::HeightFeet => "heightFeet",
            VitalKind::HeightInches => "heightInches",
            VitalKind::Weight => "weight",
            VitalKind::BloodPressureSystolic => "bloodPressureSystolic",
            VitalKind::BloodPressureDiastolic => "bloodPressureDiastolic",
            VitalKind::Glucose => "glucose",
        }
    }

    /// Unit used when seeding a catalog from scratch.
    pub fn default_unit(self) -> &'static str {
        match self {
            VitalKind::RespiratoryRate => "breaths/min",
            VitalKind::HeartRate => "bpm",
            VitalKind::Temperature => "°C",
            VitalKind::OxygenSaturation => "%",
            VitalKind::HeightFeet => "ft",
            VitalKind::HeightInches => "in",
            VitalKind::Weight => "lbs",
            VitalKind::BloodPressureSystolic | VitalKind::BloodPressureDiastolic => "mmHg",
            VitalKind::Glucose => "mg/dL",
        }
    }
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VitalKind {
    type Err = TriageError;

    /// Accepts the catalog name in any case, with or without `_`/`-` separators
    /// (`heartRate`, `heart_rate`, `heart-rate`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        VitalKind::ALL
            .into_iter()
            .find(|kind| kind.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| TriageError::InvalidInput(format!("unknown vital kind: '{}'", s.trim())))
    }
}

/// Raw vital values as submitted on the intake form.
///
/// Every field defaults to `0.0`. Zero, negative and NaN values all mean "not provided".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VitalReadings {
    pub respiratory_rate: f32,
    pub heart_rate: f32,
    pub temperature: f32,
    pub oxygen_saturation: f32,
    pub height_feet: f32,
    pub height_inches: f32,
    pub weight: f32,
    pub blood_pressure_systolic: f32,
    pub blood_pressure_diastolic: f32,
    pub glucose: f32,
}

impl VitalReadings {
    pub fn get(&self, kind: VitalKind) -> f32 {
        match kind {
            VitalKind::RespiratoryRate => self.respiratory_rate,
            VitalKind::HeartRate => self.heart_rate,
            VitalKind::Temperature => self.temperature,
            VitalKind::OxygenSaturation => self.oxygen_saturation,
            VitalKind::HeightFeet => self.height_feet,
            VitalKind::HeightInches => self.height_inches,
            VitalKind::Weight => self.weight,
            VitalKind::BloodPressureSystolic => self.blood_pressure_systolic,
            VitalKind::BloodPressureDiastolic => self.blood_pressure_diastolic,
            VitalKind::Glucose => self.glucose,
        }
    }

    pub fn set(&mut self, kind: VitalKind, value: f32) {
        let slot = match kind {
            VitalKind::RespiratoryRate => &mut self.respiratory_rate,
            VitalKind::HeartRate => &mut self.heart_rate,
            VitalKind::Temperature => &mut self.temperature,
            VitalKind::OxygenSaturation => &mut self.oxygen_saturation,
            VitalKind::HeightFeet => &mut self.height_feet,
            VitalKind::HeightInches => &mut self.height_inches,
            VitalKind::Weight => &mut self.weight,
            VitalKind::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            VitalKind::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            VitalKind::Glucose => &mut self.glucose,
        };
        *slot = value;
    }

    /// Every `(kind, raw value)` pair in intake order.
    pub fn entries(&self) -> [(VitalKind, f32); 10] {
        VitalKind::ALL.map(|kind| (kind, self.get(kind)))
    }

    /// The pairs worth recording: strictly positive values only.
    pub fn provided(&self) -> impl Iterator<Item = (VitalKind, f32)> {
        self.entries().into_iter().filter(|(_, value)| *value > 0.0)
    }
}

/// A catalog entry describing one kind of vital sign.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalDefinition {
    pub id: VitalId,
    pub name: String,
    pub unit_of_measurement: String,
    pub sort_order: u32,
}

/// The ten-kind catalog written when a data directory has none.
pub fn default_catalog() -> Vec<VitalDefinition> {
    VitalKind::ALL
        .into_iter()
        .zip(1u32..)
        .map(|(kind, order)| VitalDefinition {
            id: VitalId::new(u64::from(order)),
            name: kind.name().to_string(),
            unit_of_measurement: kind.default_unit().to_string(),
            sort_order: order,
        })
        .collect()
}

/// A measurement ready to be persisted; the store assigns the identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVitalMeasurement {
    pub vital_id: VitalId,
    pub encounter_id: EncounterId,
    pub user_id: UserId,
    pub value: f32,
    pub date_taken: DateTime<Utc>,
}

impl NewVitalMeasurement {
    pub fn into_measurement(self, id: MeasurementId) -> VitalMeasurement {
        VitalMeasurement {
            id,
            vital_id: self.vital_id,
            encounter_id: self.encounter_id,
            user_id: self.user_id,
            value: self.value,
            date_taken: self.date_taken,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalMeasurement {
    pub id: MeasurementId,
    pub vital_id: VitalId,
    pub encounter_id: EncounterId,
    pub user_id: UserId,
    pub value: f32,
    pub date_taken: DateTime<Utc>,
}

/// A vital that could not be recorded during an otherwise successful intake.
#[derive(Debug)]
pub struct VitalWarning {
    pub kind: VitalKind,
    pub error: TriageError,
}

/// Records individual vital measurements against an encounter.
#[derive(Clone)]
pub struct VitalRecorder {
    catalog: Arc<dyn VitalCatalog>,
    store: Arc<dyn VitalStore>,
}

impl VitalRecorder {
    pub fn new(catalog: Arc<dyn VitalCatalog>, store: Arc<dyn VitalStore>) -> Self {
        Self { catalog, store }
    }

    /// Resolves `kind` in the catalog and persists one measurement.
    ///
    /// Callers decide whether a value is worth recording; this method records whatever it is
    /// given.
    ///
    /// # Errors
    ///
    /// - `TriageError::VitalNotFound` if the catalog has no entry for `kind`
    /// - `TriageError::Persistence` if the catalog read or the measurement write fails
    pub fn record(
        &self,
        kind: VitalKind,
        value: f32,
        user_id: UserId,
        encounter_id: EncounterId,
    ) -> TriageResult<VitalMeasurement> {
        let definition = self
            .catalog
            .find_by_name(kind.name())
            .map_err(TriageError::persistence("read vital catalog"))?
            .ok_or_else(|| TriageError::VitalNotFound(kind.name().to_string()))?;

        let measurement = NewVitalMeasurement {
            vital_id: definition.id,
            encounter_id,
            user_id,
            value,
            date_taken: Utc::now(),
        };

        self.store
            .create(measurement)
            .map_err(TriageError::persistence("create vital measurement"))
    }
}
