//! Data behind the triage intake form.
//!
//! The form is shown blank for a new patient, or pre-populated when the user arrives from a
//! patient search. A failed search never fails the page: the form is shown blank with
//! `search_error` set so the user can retry.

use crate::error::{TriageError, TriageResult};
use crate::patient::Patient;
use crate::repositories::{PatientLookup, VitalCatalog};
use crate::vitals::VitalDefinition;
use std::sync::Arc;
use triage_types::PatientId;

/// What the intake form needs to render.
#[derive(Clone, Debug, PartialEq)]
pub struct TriageForm {
    /// Catalog entries in display order, used to name the vital inputs.
    pub vitals: Vec<VitalDefinition>,
    pub patient: Option<Patient>,
    pub search_error: bool,
}

#[derive(Clone)]
pub struct TriageFormService {
    lookup: Arc<dyn PatientLookup>,
    catalog: Arc<dyn VitalCatalog>,
}

impl TriageFormService {
    pub fn new(lookup: Arc<dyn PatientLookup>, catalog: Arc<dyn VitalCatalog>) -> Self {
        Self { lookup, catalog }
    }

    /// The form for registering a new patient.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Persistence` if the vital catalog cannot be read.
    pub fn blank_form(&self) -> TriageResult<TriageForm> {
        Ok(TriageForm {
            vitals: self.vitals()?,
            patient: None,
            search_error: false,
        })
    }

    /// The form for a new encounter of a patient found by search.
    ///
    /// `raw_id` is the identifier exactly as received (for example from a query string). A
    /// missing, blank, malformed or unknown identifier sets `search_error` instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Persistence` if the vital catalog cannot be read.
    pub fn populated_form(&self, raw_id: Option<&str>) -> TriageResult<TriageForm> {
        let patient = match raw_id.map(str::parse::<PatientId>) {
            None => None,
            Some(Err(e)) => {
                tracing::debug!("rejected patient search id: {}", e);
                None
            }
            Some(Ok(id)) => match self.lookup.find_by_id(id) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("patient search for {} failed: {}", id, e);
                    None
                }
            },
        };

        Ok(TriageForm {
            vitals: self.vitals()?,
            search_error: patient.is_none(),
            patient,
        })
    }

    fn vitals(&self) -> TriageResult<Vec<VitalDefinition>> {
        self.catalog
            .find_all()
            .map_err(TriageError::persistence("read vital catalog"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::RecordingStore;

    fn service(store: &Arc<RecordingStore>) -> TriageFormService {
        TriageFormService::new(store.clone(), store.clone())
    }

    #[test]
    fn blank_form_lists_catalog() {
        let store = Arc::new(RecordingStore::default());
        let form = service(&store).blank_form().expect("blank form");

        assert_eq!(form.vitals.len(), 10);
        assert_eq!(form.patient, None);
        assert!(!form.search_error);
    }

    #[test]
    fn populated_form_finds_patient() {
        let store = Arc::new(RecordingStore::default());
        let patient = store.seed_patient(42);

        let form = service(&store)
            .populated_form(Some(" 42 "))
            .expect("populated form");

        assert_eq!(form.patient, Some(patient));
        assert!(!form.search_error);
    }

    #[test]
    fn populated_form_flags_bad_searches() {
        let store = Arc::new(RecordingStore::default());
        store.seed_patient(42);
        let service = service(&store);

        for raw in [None, Some(""), Some("  "), Some("forty-two"), Some("43")] {
            let form = service.populated_form(raw).expect("form should render");
            assert!(form.search_error, "{raw:?} should flag a search error");
            assert_eq!(form.patient, None);
            assert_eq!(form.vitals.len(), 10);
        }
    }

    #[test]
    fn catalog_failure_is_fatal() {
        let store = Arc::new(RecordingStore::default());
        store.fail_catalog_reads();

        let err = service(&store).blank_form().expect_err("catalog failure");
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(service(&store).populated_form(Some("1")).is_err());
    }
}
