use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use turnos_core::{
    models::slot::{
        AssignSlotRequest, AssignSlotResponse, CreateSlotRequest, MessageResponse, Slot,
        UpdateAvailabilityRequest,
    },
    services::{
        recurrence::{self, AssignmentPlan},
        slots,
    },
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
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppJson(payload): AppJson<CreateSlotRequest>,
) -> Result<(StatusCode, Json<Slot>), AppError> {
    let slot = slots::create_slot(
        &*state.store,
        admin.id,
        payload.datetime,
        payload.location.as_deref(),
        state.clock.now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
) -> Result<Json<Vec<Slot>>, AppError> {
    let slots = slots::list_own_slots(&*state.store, admin.id).await?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateAvailabilityRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    slots::update_availability(&*state.store, admin.id, id, payload.available).await?;

    Ok(Json(MessageResponse {
        message: "Disponibilidad actualizada exitosamente".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    slots::delete_slot(&*state.store, admin.id, id).await?;

    Ok(Json(MessageResponse {
        message: "Turno eliminado exitosamente".to_string(),
    }))
}

/// Direct assignment, optionally repeated weekly
#[axum::debug_handler]
pub async fn assign_slot(
    State(state): State<Arc<ApiState>>,
    admin: AdminIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AssignSlotRequest>,
) -> Result<Json<AssignSlotResponse>, AppError> {
    let plan = AssignmentPlan::from_request(id, &payload)?;
    let slots = recurrence::assign_with_recurrence(
        &*state.store,
        admin.id,
        &plan,
        state.timezone,
        state.clock.now(),
    )
    .await?;

    Ok(Json(AssignSlotResponse {
        sessions_created: slots.len(),
        slots,
    }))
}
