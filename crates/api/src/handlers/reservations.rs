use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use turnos_core::{
    models::slot::{
        DecideReservationRequest, LinkPatientRequest, ReserveSlotRequest, ReserveSlotResponse, Slot,
    },
    services::reservation,
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

/// Public booking form
#[axum::debug_handler]
pub async fn reserve_slot(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<ReserveSlotRequest>,
) -> Result<(StatusCode, Json<ReserveSlotResponse>), AppError> {
    let slot = reservation::reserve(&*state.store, &payload, state.clock.now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveSlotResponse {
            success: true,
            message: "Turno reservado exitosamente".to_string(),
            slot,
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_pending(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
) -> Result<Json<Vec<Slot>>, AppError> {
    let slots = reservation::list_pending(&*state.store).await?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn decide_reservation(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<DecideReservationRequest>,
) -> Result<Json<Slot>, AppError> {
    tracing::debug!("Admin {} deciding reservation on slot {}", admin.username, id);

    let slot = reservation::decide_reservation(
        &*state.store,
        id,
        &payload.status,
        payload.message.as_deref(),
        state.clock.now(),
    )
    .await?;

    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn link_patient(
    State(state): State<Arc<ApiState>>,
    _admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<LinkPatientRequest>,
) -> Result<Json<Slot>, AppError> {
    let slot = reservation::link_patient(&*state.store, id, payload.patient_id).await?;
    Ok(Json(slot))
}
