//! # Reservation Engine
//!
//! Public booking and the administrator's decision on it.
//!
//! ```text
//! open --reserve--> pending --decide(confirmada)--> confirmed
//!                      \------decide(rechazada)---> rejected (slot open again)
//! ```
//!
//! Booking is a single conditional update in the store, so two requests for the
//! same slot can never both succeed. Losing that race is a normal outcome and is
//! reported as [`ClinicError::SlotUnavailable`]; it is never retried.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::slot::{Decision, ReservationRequest, ReserveSlotRequest, Slot},
    services::{required, slots::not_found},
    store::Store,
};

const MAX_AGE: i32 = 150;

/// Checks that every booking field is present and non-blank.
pub fn validate_reservation(request: &ReserveSlotRequest) -> ClinicResult<(Uuid, ReservationRequest)> {
    let missing = || ClinicError::Validation("Faltan datos requeridos para la reserva".to_string());

    let slot_id = request.slot_id.ok_or_else(missing)?;
    let name = required(request.name.as_deref(), "nombre").map_err(|_| missing())?;
    let surname = required(request.surname.as_deref(), "apellido").map_err(|_| missing())?;
    let reason = required(request.reason.as_deref(), "motivo").map_err(|_| missing())?;
    let age = match request.age {
        Some(age) if age > 0 && age <= MAX_AGE => age,
        Some(age) => {
            return Err(ClinicError::Validation(format!("edad {} is out of range", age)));
        }
        None => return Err(missing()),
    };

    Ok((
        slot_id,
        ReservationRequest {
            name,
            surname,
            age,
            reason,
        },
    ))
}

/// Books an open, future slot for a member of the public.
pub async fn reserve(
    store: &dyn Store,
    request: &ReserveSlotRequest,
    now: DateTime<Utc>,
) -> ClinicResult<Slot> {
    let (slot_id, reservation) = validate_reservation(request)?;

    match store.claim_slot(slot_id, &reservation, now).await? {
        Some(slot) => {
            info!("Slot {} reserved by {} {}", slot.id, reservation.name, reservation.surname);
            Ok(slot)
        }
        None => {
            debug!("Reservation attempt lost or stale: slot={}", slot_id);
            Err(ClinicError::SlotUnavailable(
                "El turno seleccionado ya no está disponible".to_string(),
            ))
        }
    }
}

/// Confirms or rejects a pending reservation.
///
/// A rejection puts the slot back on public booking and keeps the rejected
/// reservation on the slot until someone books it again.
pub async fn decide_reservation(
    store: &dyn Store,
    slot_id: Uuid,
    decision: &str,
    admin_message: Option<&str>,
    now: DateTime<Utc>,
) -> ClinicResult<Slot> {
    let decision = Decision::parse(decision.trim()).ok_or_else(|| {
        ClinicError::InvalidState(format!(
            "Estado inválido '{}': expected confirmada or rechazada",
            decision
        ))
    })?;
    let admin_message = admin_message.map(str::trim).filter(|m| !m.is_empty());

    if let Some(slot) = store
        .decide_reservation(slot_id, decision.status(), admin_message, now)
        .await?
    {
        info!("Reservation on slot {} set to {}", slot_id, decision.status().as_str());
        return Ok(slot);
    }

    match store.find_slot(slot_id).await? {
        None => Err(not_found(slot_id)),
        Some(slot) => match slot.reservation {
            None => Err(ClinicError::InvalidState(format!(
                "Slot {} has no reservation",
                slot_id
            ))),
            Some(reservation) => Err(ClinicError::InvalidState(format!(
                "Reservation on slot {} is already {}",
                slot_id,
                reservation.status.as_str()
            ))),
        },
    }
}

/// Pending reservations, most recent request first.
pub async fn list_pending(store: &dyn Store) -> ClinicResult<Vec<Slot>> {
    store.list_pending().await
}

/// Attaches a patient record to the active reservation of a slot.
///
/// The patient is locked for the duration so a concurrent deletion cannot leave
/// the slot pointing at a record that no longer exists.
pub async fn link_patient(store: &dyn Store, slot_id: Uuid, patient_id: Uuid) -> ClinicResult<Slot> {
    let mut tx = store.begin().await?;

    if tx.find_patient_for_update(patient_id).await?.is_none() {
        return Err(ClinicError::NotFound(format!(
            "Patient with ID {} not found",
            patient_id
        )));
    }

    let linked = tx.link_reservation_patient(slot_id, patient_id).await?;
    tx.commit().await?;

    if let Some(slot) = linked {
        debug!("Reservation on slot {} linked to patient {}", slot_id, patient_id);
        return Ok(slot);
    }

    match store.find_slot(slot_id).await? {
        None => Err(not_found(slot_id)),
        Some(_) => Err(ClinicError::InvalidState(format!(
            "Slot {} has no active reservation",
            slot_id
        ))),
    }
}
