//! Encounters (clinical visits) and their creation.

use crate::error::{TriageError, TriageResult};
use crate::patient::Patient;
use crate::repositories::EncounterStore;
use crate::user::ActingUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_types::{EncounterId, PatientId, UserId};

/// One clinical visit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub patient_id: PatientId,
    pub user_id: UserId,
    pub date_of_visit: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_pregnant: Option<u32>,
}

/// An encounter ready to be persisted; the store assigns the identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEncounter {
    pub patient_id: PatientId,
    pub user_id: UserId,
    pub date_of_visit: DateTime<Utc>,
    pub chief_complaint: Option<String>,
    pub weeks_pregnant: Option<u32>,
}

impl NewEncounter {
    pub fn into_encounter(self, id: EncounterId) -> Encounter {
        Encounter {
            id,
            patient_id: self.patient_id,
            user_id: self.user_id,
            date_of_visit: self.date_of_visit,
            chief_complaint: self.chief_complaint,
            weeks_pregnant: self.weeks_pregnant,
        }
    }
}

/// Visit-level fields from the intake form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitAttributes {
    pub chief_complaint: Option<String>,
    pub weeks_pregnant: Option<u32>,
}

/// Builds and persists encounters.
#[derive(Clone)]
pub struct EncounterFactory {
    store: Arc<dyn EncounterStore>,
}

impl EncounterFactory {
    pub fn new(store: Arc<dyn EncounterStore>) -> Self {
        Self { store }
    }

    /// Creates the encounter for `patient`, attributed to `user`, dated now.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Persistence` if the store rejects the write. There is no retry.
    pub fn create(
        &self,
        visit: &VisitAttributes,
        user: &ActingUser,
        patient: &Patient,
    ) -> TriageResult<Encounter> {
        let chief_complaint = visit
            .chief_complaint
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let encounter = NewEncounter {
            patient_id: patient.id,
            user_id: user.id,
            date_of_visit: Utc::now(),
            chief_complaint,
            weeks_pregnant: visit.weeks_pregnant.filter(|weeks| *weeks > 0),
        };

        self.store
            .create(encounter)
            .map_err(TriageError::persistence("create encounter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingStore;

    #[test]
    fn encounter_references_patient_and_user() {
        let store = Arc::new(RecordingStore::default());
        let patient = store.seed_patient(42);
        let factory = EncounterFactory::new(store.clone());

        let visit = VisitAttributes {
            chief_complaint: Some("  headache ".into()),
            weeks_pregnant: Some(0),
        };
        let encounter = factory
            .create(&visit, &ActingUser::new(UserId::new(3)), &patient)
            .expect("create should succeed");

        assert_eq!(encounter.patient_id, PatientId::new(42));
        assert_eq!(encounter.user_id, UserId::new(3));
        assert_eq!(encounter.chief_complaint.as_deref(), Some("headache"));
        assert_eq!(encounter.weeks_pregnant, None);
        assert_eq!(store.encounters().len(), 1);
    }

    #[test]
    fn store_failure_is_persistence_error() {
        let store = Arc::new(RecordingStore::default());
        let patient = store.seed_patient(1);
        store.fail_encounter_create();
        let factory = EncounterFactory::new(store.clone());

        let err = factory
            .create(
                &VisitAttributes::default(),
                &ActingUser::new(UserId::new(3)),
                &patient,
            )
            .expect_err("create should fail");

        assert!(matches!(
            err,
            TriageError::Persistence {
                action: "create encounter",
                ..
            }
        ));
        assert!(store.encounters().is_empty());
    }
}
