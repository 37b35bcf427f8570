//! Patient records and identity resolution.
//!
//! An intake either registers a new patient or attaches to an existing one. [`PatientResolver`]
//! makes that decision and performs the single store write it implies.

use crate::error::{TriageError, TriageResult};
use crate::repositories::{PatientLookup, PatientStore};
use crate::user::ActingUser;
use crate::validation::validate_birth_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_types::{NonEmptyText, PatientId, UserId};

/// A stored patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// A patient ready to be persisted; the store assigns the identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPatient {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<NonEmptyText>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewPatient {
    pub fn into_patient(self, id: PatientId) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            sex: self.sex,
            address: self.address,
            city: self.city,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// Patient fields as submitted on the intake form.
///
/// For a returning patient only `sex` is read; the remaining fields describe a new registration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientAttributes {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Which patient an intake is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatientSelection {
    New,
    Existing(PatientId),
}

impl PatientSelection {
    /// Interprets the legacy numeric route parameter, where `0` means "new patient".
    pub fn from_raw_id(raw: u64) -> Self {
        match raw {
            0 => PatientSelection::New,
            id => PatientSelection::Existing(PatientId::new(id)),
        }
    }

    /// Parses a raw identifier string as submitted by a client.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Id` if `raw` is blank or not a non-negative integer.
    pub fn parse(raw: &str) -> TriageResult<Self> {
        let id: PatientId = raw.parse()?;
        Ok(Self::from_raw_id(id.get()))
    }
}

/// Resolves the patient an intake belongs to.
#[derive(Clone)]
pub struct PatientResolver {
    lookup: Arc<dyn PatientLookup>,
    store: Arc<dyn PatientStore>,
}

impl PatientResolver {
    pub fn new(lookup: Arc<dyn PatientLookup>, store: Arc<dyn PatientStore>) -> Self {
        Self { lookup, store }
    }

    /// Creates or fetches the patient for `selection`.
    ///
    /// - `New` builds a patient from `attributes` owned by `user` and persists it.
    /// - `Existing(id)` fetches the patient and, when `attributes.sex` is non-blank, updates that
    ///   one field. The identifier of a fetched patient never changes.
    ///
    /// # Errors
    ///
    /// - `TriageError::Text`/`InvalidInput` if a new patient lacks a name or has a future birth date
    /// - `TriageError::PatientNotFound` if an existing patient does not exist
    /// - `TriageError::Persistence` if the lookup, create or update fails
    pub fn resolve(
        &self,
        selection: PatientSelection,
        attributes: &PatientAttributes,
        user: &ActingUser,
    ) -> TriageResult<Patient> {
        match selection {
            PatientSelection::New => self.create(attributes, user),
            PatientSelection::Existing(id) => self.fetch_existing(id, attributes),
        }
    }

    fn create(&self, attributes: &PatientAttributes, user: &ActingUser) -> TriageResult<Patient> {
        let birth_date = attributes.birth_date;
        validate_birth_date(birth_date, Utc::now().date_naive())?;

        let new_patient = NewPatient {
            first_name: NonEmptyText::new(&attributes.first_name)?,
            last_name: NonEmptyText::new(&attributes.last_name)?,
            birth_date,
            sex: NonEmptyText::from_optional(attributes.sex.as_deref()),
            address: non_blank(attributes.address.as_deref()),
            city: non_blank(attributes.city.as_deref()),
            created_by: user.id,
            created_at: Utc::now(),
        };

        let patient = self
            .store
            .create(new_patient)
            .map_err(TriageError::persistence("create patient"))?;
        tracing::debug!("created patient {}", patient.id);
        Ok(patient)
    }

    fn fetch_existing(
        &self,
        id: PatientId,
        attributes: &PatientAttributes,
    ) -> TriageResult<Patient> {
        let patient = self
            .lookup
            .find_by_id(id)
            .map_err(TriageError::persistence("look up patient"))?
            .ok_or(TriageError::PatientNotFound(id))?;

        let Some(sex) = NonEmptyText::from_optional(attributes.sex.as_deref()) else {
            return Ok(patient);
        };

        let updated = self
            .store
            .update_sex(patient.id, &sex)
            .map_err(TriageError::persistence("update patient sex"))?;
        tracing::debug!("updated sex for patient {}", patient.id);

        Ok(Patient {
            id: patient.id,
            ..updated
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    NonEmptyText::from_optional(value).map(NonEmptyText::into_inner)
}
