use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        admin::AdminId,
        slot::{NewSlot, Slot},
    },
    services::required,
    store::Store,
};

pub async fn create_slot(
    store: &dyn Store,
    admin: AdminId,
    datetime: Option<DateTime<Utc>>,
    location: Option<&str>,
    now: DateTime<Utc>,
) -> ClinicResult<Slot> {
    let datetime =
        datetime.ok_or_else(|| ClinicError::Validation("fecha is required".to_string()))?;
    let location = required(location, "sede")?;

    let slot = store
        .insert_slot(
            NewSlot {
                datetime,
                location,
                created_by: admin.0,
                assignment: None,
            },
            now,
        )
        .await?;

    debug!("Slot created: id={}, sede={}, fecha={}", slot.id, slot.location, slot.datetime);
    Ok(slot)
}

pub async fn list_own_slots(store: &dyn Store, admin: AdminId) -> ClinicResult<Vec<Slot>> {
    store.find_by_owner(admin.0).await
}

pub async fn delete_slot(store: &dyn Store, admin: AdminId, id: Uuid) -> ClinicResult<()> {
    if store.delete_slot(id, admin.0).await? {
        debug!("Slot deleted: id={}", id);
        Ok(())
    } else {
        Err(not_found(id))
    }
}

/// Opens or withdraws an unclaimed slot for public booking.
pub async fn update_availability(
    store: &dyn Store,
    admin: AdminId,
    id: Uuid,
    available: bool,
) -> ClinicResult<Slot> {
    if let Some(slot) = store.update_availability(id, available, admin.0).await? {
        return Ok(slot);
    }

    match store.find_slot(id).await? {
        Some(slot) if slot.created_by == admin.0 => Err(ClinicError::InvalidState(format!(
            "Slot {} is claimed; its availability follows its reservation or assignment",
            id
        ))),
        _ => Err(not_found(id)),
    }
}

pub(crate) fn not_found(id: Uuid) -> ClinicError {
    ClinicError::NotFound(format!("Slot with ID {} not found", id))
}
