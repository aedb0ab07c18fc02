use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use turnos_core::{
    errors::ClinicError,
    models::{
        patient::{
            AddNoteRequest, AddNoteResponse, CreatePatientRequest, CreatePatientResponse,
            GetPatientResponse, MedicalNote, Patient, PatientChanges,
        },
        slot::MessageResponse,
    },
    services::patients,
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::AdminIdentity,
        error_handling::AppError,
        extract::{AppJson, AppPath},
    },
};

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
) -> Result<Json<Vec<Patient>>, AppError> {
    let patients = patients::list_patients(&*state.store).await?;
    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppJson(payload): AppJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<CreatePatientResponse>), AppError> {
    let patient = patients::create_patient(&*state.store, payload, state.clock.now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePatientResponse {
            success: true,
            id: patient.id,
            message: "Paciente creado exitosamente".to_string(),
        }),
    ))
}

/// Patient profile with its notes, newest first
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<GetPatientResponse>, AppError> {
    let patient = patients::get_patient(&*state.store, id).await?;
    let notes = patients::get_notes(&*state.store, id).await?;

    Ok(Json(GetPatientResponse { patient, notes }))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<PatientChanges>,
) -> Result<Json<Patient>, AppError> {
    let patient = patients::update_patient(&*state.store, id, payload, state.clock.now()).await?;
    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !patients::delete_patient(&*state.store, id).await? {
        return Err(ClinicError::NotFound("Paciente no encontrado".to_string()).into());
    }
    tracing::info!("Patient {} deleted by admin {}", id, admin.username);

    Ok(Json(MessageResponse {
        message: "Paciente eliminado exitosamente".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn list_notes(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<MedicalNote>>, AppError> {
    let notes = patients::get_notes(&*state.store, id).await?;
    Ok(Json(notes))
}

#[axum::debug_handler]
pub async fn add_note(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddNoteRequest>,
) -> Result<Json<AddNoteResponse>, AppError> {
    let note = patients::add_note(
        &*state.store,
        id,
        payload.content.as_deref(),
        state.clock.now(),
    )
    .await?;

    Ok(Json(AddNoteResponse {
        message: "Nota agregada exitosamente".to_string(),
        note,
    }))
}
