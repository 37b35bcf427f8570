//! Triage endpoints and the mapping between wire types and core types.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, JsonBody};
use crate::AppState;
use api_shared::{
    HealthRes, HealthService, IntakeReq, IntakeRes, PatientRes, TriageFormRes,
    VitalDefinitionRes, VitalWarningRes,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use triage_core::validation::parse_optional_date;
use triage_core::{
    ErrorKind, IntakeForm, IntakeOutcome, Patient, PatientAttributes, PatientSelection,
    TriageForm, TriageResult, VisitAttributes, VitalDefinition, VitalReadings,
};
use utoipa::IntoParams;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/triage",
    responses(
        (status = 200, description = "Blank intake form", body = TriageFormRes),
        (status = 401, description = "Missing or invalid credentials", body = api_shared::ErrorRes),
        (status = 500, description = "Internal server error", body = api_shared::ErrorRes)
    )
)]
/// Form data for registering a new patient.
pub async fn blank_form(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<TriageFormRes>, ApiError> {
    let form = state.forms.blank_form()?;
    Ok(Json(form_res(form)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PopulatedFormQuery {
    /// Patient identifier from a previous search.
    pub id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/triage/populated",
    params(PopulatedFormQuery),
    responses(
        (status = 200, description = "Intake form, pre-populated when the patient was found", body = TriageFormRes),
        (status = 401, description = "Missing or invalid credentials", body = api_shared::ErrorRes),
        (status = 500, description = "Internal server error", body = api_shared::ErrorRes)
    )
)]
/// Form data for a new encounter of a patient found by search.
///
/// An unknown or malformed `id` is reported through `search_error`, not as an HTTP error.
pub async fn populated_form(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<PopulatedFormQuery>,
) -> Result<Json<TriageFormRes>, ApiError> {
    let form = state.forms.populated_form(query.id.as_deref())?;
    Ok(Json(form_res(form)))
}

#[utoipa::path(
    post,
    path = "/triage",
    request_body = IntakeReq,
    responses(
        (status = 201, description = "Patient, encounter and vitals recorded", body = IntakeRes),
        (status = 400, description = "Invalid intake data or malformed body", body = api_shared::ErrorRes),
        (status = 401, description = "Missing or invalid credentials", body = api_shared::ErrorRes),
        (status = 500, description = "Internal server error", body = api_shared::ErrorRes)
    )
)]
/// Records an intake for a new patient.
pub async fn intake_new_patient(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    JsonBody(req): JsonBody<IntakeReq>,
) -> Result<(StatusCode, Json<IntakeRes>), ApiError> {
    submit(&state, PatientSelection::New, &user, req)
}

#[utoipa::path(
    post,
    path = "/triage/{id}",
    request_body = IntakeReq,
    params(
        ("id" = String, Path, description = "Existing patient identifier; 0 registers a new patient")
    ),
    responses(
        (status = 201, description = "Encounter and vitals recorded", body = IntakeRes),
        (status = 400, description = "Invalid intake data or identifier", body = api_shared::ErrorRes),
        (status = 401, description = "Missing or invalid credentials", body = api_shared::ErrorRes),
        (status = 404, description = "Patient not found", body = api_shared::ErrorRes),
        (status = 500, description = "Internal server error", body = api_shared::ErrorRes)
    )
)]
/// Records an intake for an existing patient.
pub async fn intake_existing_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AuthenticatedUser(user): AuthenticatedUser,
    JsonBody(req): JsonBody<IntakeReq>,
) -> Result<(StatusCode, Json<IntakeRes>), ApiError> {
    let selection = PatientSelection::parse(&id)?;
    submit(&state, selection, &user, req)
}

fn submit(
    state: &AppState,
    selection: PatientSelection,
    user: &triage_core::ActingUser,
    req: IntakeReq,
) -> Result<(StatusCode, Json<IntakeRes>), ApiError> {
    let form = intake_form(req)?;
    let outcome = state.orchestrator.submit_intake(&form, selection, user)?;
    Ok((StatusCode::CREATED, Json(intake_res(outcome))))
}

fn intake_form(req: IntakeReq) -> TriageResult<IntakeForm> {
    let birth_date = parse_optional_date(req.birth_date.as_deref())?;

    let vitals = VitalReadings {
        respiratory_rate: req.respiratory_rate.unwrap_or_default(),
        heart_rate: req.heart_rate.unwrap_or_default(),
        temperature: req.temperature.unwrap_or_default(),
        oxygen_saturation: req.oxygen_saturation.unwrap_or_default(),
        height_feet: req.height_feet.unwrap_or_default(),
        height_inches: req.height_inches.unwrap_or_default(),
        weight: req.weight.unwrap_or_default(),
        blood_pressure_systolic: req.blood_pressure_systolic.unwrap_or_default(),
        blood_pressure_diastolic: req.blood_pressure_diastolic.unwrap_or_default(),
        glucose: req.glucose.unwrap_or_default(),
    };

    Ok(IntakeForm {
        patient: PatientAttributes {
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date,
            sex: req.sex,
            address: req.address,
            city: req.city,
        },
        visit: VisitAttributes {
            chief_complaint: req.chief_complaint,
            weeks_pregnant: req.weeks_pregnant,
        },
        vitals,
    })
}

fn intake_res(outcome: IntakeOutcome) -> IntakeRes {
    let warnings = outcome
        .warnings
        .iter()
        .map(|warning| {
            let (reason, message) = match warning.error.kind() {
                ErrorKind::NotFound => ("not_found", warning.error.to_string()),
                _ => ("persistence", "vital could not be stored".to_string()),
            };
            VitalWarningRes {
                vital: warning.kind.name().to_string(),
                reason: reason.to_string(),
                message,
            }
        })
        .collect();

    IntakeRes {
        patient_id: outcome.patient_id.get(),
        encounter_id: outcome.encounter_id.get(),
        redirect: outcome.redirect_path(),
        recorded_vitals: outcome
            .recorded
            .iter()
            .map(|kind| kind.name().to_string())
            .collect(),
        warnings,
    }
}

fn form_res(form: TriageForm) -> TriageFormRes {
    TriageFormRes {
        vitals: form.vitals.into_iter().map(vital_res).collect(),
        patient: form.patient.map(patient_res),
        search_error: form.search_error,
    }
}

fn vital_res(definition: VitalDefinition) -> VitalDefinitionRes {
    VitalDefinitionRes {
        id: definition.id.get(),
        name: definition.name,
        unit_of_measurement: definition.unit_of_measurement,
        sort_order: definition.sort_order,
    }
}

fn patient_res(patient: Patient) -> PatientRes {
    PatientRes {
        id: patient.id.get(),
        first_name: patient.first_name.into_inner(),
        last_name: patient.last_name.into_inner(),
        birth_date: patient.birth_date.map(|d| d.to_string()),
        sex: patient.sex.map(|s| s.into_inner()),
        address: patient.address,
        city: patient.city,
        created_at: patient.created_at.to_rfc3339(),
    }
}
