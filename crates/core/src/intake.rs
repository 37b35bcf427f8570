//! Intake orchestration.
//!
//! An intake submission moves through a fixed sequence of states:
//!
//! ```text
//! Start -> PatientResolved -> EncounterCreated -> (vitals processed) -> IntakeOutcome
//! ```
//!
//! Each transition consumes the previous state, so an encounter cannot be created before a
//! patient has been resolved and vitals cannot be recorded before the encounter exists. The first
//! two transitions are fatal on failure. Vital recording never fails the intake: each failed vital
//! becomes a [`VitalWarning`] on the outcome.
//!
//! Nothing is rolled back. A patient written in step one stays written if encounter creation then
//! fails.

use crate::constants::PATIENT_VIEW_PATH;
use crate::encounter::{Encounter, EncounterFactory, VisitAttributes};
use crate::error::TriageResult;
use crate::patient::{Patient, PatientAttributes, PatientResolver, PatientSelection};
use crate::repositories::TriageBackend;
use crate::user::ActingUser;
use crate::vitals::{VitalKind, VitalReadings, VitalRecorder, VitalWarning};
use std::sync::Arc;
use triage_types::{EncounterId, PatientId};

/// Everything submitted on the intake form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntakeForm {
    pub patient: PatientAttributes,
    pub visit: VisitAttributes,
    pub vitals: VitalReadings,
}

/// Result of a successful intake.
#[derive(Debug)]
pub struct IntakeOutcome {
    /// Navigation target for the caller.
    pub patient_id: PatientId,
    pub encounter_id: EncounterId,
    /// Kinds recorded, in intake order.
    pub recorded: Vec<VitalKind>,
    /// Kinds that were submitted but could not be recorded.
    pub warnings: Vec<VitalWarning>,
}

impl IntakeOutcome {
    /// Path of the patient view to redirect to.
    pub fn redirect_path(&self) -> String {
        format!("{PATIENT_VIEW_PATH}?id={}", self.patient_id)
    }

    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ============================================================================
// TYPE-STATE MARKERS
// ============================================================================

struct Start;

struct PatientResolved {
    patient: Patient,
}

struct EncounterCreated {
    patient: Patient,
    encounter: Encounter,
}

struct Intake<'a, S> {
    form: &'a IntakeForm,
    user: &'a ActingUser,
    state: S,
}

impl<'a> Intake<'a, Start> {
    fn start(form: &'a IntakeForm, user: &'a ActingUser) -> Self {
        Self {
            form,
            user,
            state: Start,
        }
    }

    fn resolve_patient(
        self,
        resolver: &PatientResolver,
        selection: PatientSelection,
    ) -> TriageResult<Intake<'a, PatientResolved>> {
        let patient = resolver.resolve(selection, &self.form.patient, self.user)?;
        Ok(Intake {
            form: self.form,
            user: self.user,
            state: PatientResolved { patient },
        })
    }
}

impl<'a> Intake<'a, PatientResolved> {
    fn create_encounter(
        self,
        factory: &EncounterFactory,
    ) -> TriageResult<Intake<'a, EncounterCreated>> {
        let encounter = factory.create(&self.form.visit, self.user, &self.state.patient)?;
        Ok(Intake {
            form: self.form,
            user: self.user,
            state: EncounterCreated {
                patient: self.state.patient,
                encounter,
            },
        })
    }
}

impl Intake<'_, EncounterCreated> {
    fn record_vitals(self, recorder: &VitalRecorder) -> IntakeOutcome {
        let EncounterCreated { patient, encounter } = self.state;
        let mut recorded = Vec::new();
        let mut warnings = Vec::new();

        for (kind, value) in self.form.vitals.provided() {
            match recorder.record(kind, value, self.user.id, encounter.id) {
                Ok(_) => recorded.push(kind),
                Err(error) => {
                    tracing::warn!(
                        vital = kind.name(),
                        encounter_id = %encounter.id,
                        error = %error,
                        "failed to record vital"
                    );
                    warnings.push(VitalWarning { kind, error });
                }
            }
        }

        IntakeOutcome {
            patient_id: patient.id,
            encounter_id: encounter.id,
            recorded,
            warnings,
        }
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Coordinates patient resolution, encounter creation and vital recording for one submission.
#[derive(Clone)]
pub struct IntakeOrchestrator {
    resolver: PatientResolver,
    encounters: EncounterFactory,
    vitals: VitalRecorder,
}

impl IntakeOrchestrator {
    pub fn new(
        resolver: PatientResolver,
        encounters: EncounterFactory,
        vitals: VitalRecorder,
    ) -> Self {
        Self {
            resolver,
            encounters,
            vitals,
        }
    }

    /// Wires every component to one backend.
    pub fn from_backend<B: TriageBackend + 'static>(backend: Arc<B>) -> Self {
        Self::new(
            PatientResolver::new(backend.clone(), backend.clone()),
            EncounterFactory::new(backend.clone()),
            VitalRecorder::new(backend.clone(), backend),
        )
    }

    /// Runs one intake submission.
    ///
    /// # Errors
    ///
    /// Returns the error from patient resolution or encounter creation. Either aborts the intake
    /// before any vital is recorded. Vital failures are reported in
    /// [`IntakeOutcome::warnings`] instead.
    pub fn submit_intake(
        &self,
        form: &IntakeForm,
        selection: PatientSelection,
        user: &ActingUser,
    ) -> TriageResult<IntakeOutcome> {
        tracing::info!("intake started by user {} ({:?})", user.id, selection);

        let outcome = Intake::start(form, user)
            .resolve_patient(&self.resolver, selection)?
            .create_encounter(&self.encounters)?
            .record_vitals(&self.vitals);

        if outcome.is_complete() {
            tracing::info!(
                "intake finished: patient {} encounter {} ({} vitals recorded)",
                outcome.patient_id,
                outcome.encounter_id,
                outcome.recorded.len()
            );
        } else {
            tracing::warn!(
                "intake finished with warnings: patient {} encounter {} ({} vitals recorded, {} failed)",
                outcome.patient_id,
                outcome.encounter_id,
                outcome.recorded.len(),
                outcome.warnings.len()
            );
        }
        Ok(outcome)
    }
}
