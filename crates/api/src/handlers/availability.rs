//! # Availability Handlers
//!
//! Public read-side endpoints behind the booking calendar.
//!
//! ```text
//! GET /api/turnos/disponibles?sede=centro
//! GET /api/dias-disponibles?mes=2025-03&sede=centro
//! ```
//!
//! A missing, blank or `todas` sede selects every location; slots opened for
//! `todas` show up under every sede.

use axum::{
    Json,
    extract::State,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use turnos_core::{
    errors::ClinicError,
    models::slot::{LocationFilter, Slot},
    services::availability::{self, YearMonth},
};

use crate::{
    ApiState,
    middleware::{error_handling::AppError, extract::AppQuery},
};

#[derive(Debug, Deserialize)]
pub struct OpenSlotsQuery {
    pub sede: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableDaysQuery {
    /// Month as `YYYY-MM`
    pub mes: Option<String>,
    pub sede: Option<String>,
}

/// Open slots from now on, earliest first
#[axum::debug_handler]
pub async fn open_slots(
    State(state): State<Arc<ApiState>>,
    AppQuery(query): AppQuery<OpenSlotsQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let filter = LocationFilter::from_query(query.sede.as_deref());
    let slots = availability::open_slots(&*state.store, &filter, state.clock.now()).await?;

    Ok(Json(slots))
}

/// Local calendar dates (`YYYY-MM-DD`) of the month with at least one open slot
#[axum::debug_handler]
pub async fn available_days(
    State(state): State<Arc<ApiState>>,
    AppQuery(query): AppQuery<AvailableDaysQuery>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let month = query
        .mes
        .as_deref()
        .ok_or_else(|| ClinicError::Validation("mes is required".to_string()))
        .and_then(YearMonth::parse)?;
    let filter = LocationFilter::from_query(query.sede.as_deref());

    let days = availability::available_days_in_month(
        &*state.store,
        month,
        &filter,
        state.timezone,
        state.clock.now(),
    )
    .await?;

    Ok(Json(days.into_iter().collect()))
}
