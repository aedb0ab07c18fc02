//! # Recurrence Generator
//!
//! Assigns a patient directly to a slot and, on request, books the same
//! wall-clock time at the same location for the following weeks.
//!
//! Weekly copies are computed in the clinic timezone so a session at 10:00 stays
//! at 10:00 across daylight-saving changes. Copies that would fall before the
//! current instant, or on a local time that does not exist, are skipped and do
//! not count towards the requested total, so fewer sessions than requested may
//! be created.
//!
//! The target slot update and every copy are written in one transaction: either
//! all of them are stored or none is.

use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        admin::AdminId,
        slot::{AssignSlotRequest, Assignment, NewSlot, Slot},
    },
    services::{required, slots::not_found},
    store::{Store, StoreTransaction},
};

pub const MAX_SESSIONS: u32 = 52;

/// A validated direct-assignment request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPlan {
    pub slot_id: Uuid,
    pub name: String,
    pub surname: String,
    /// Defaults to the target slot's datetime.
    pub base_datetime: Option<DateTime<Utc>>,
    /// Defaults to the target slot's location.
    pub location: Option<String>,
    pub session_count: u32,
}

impl AssignmentPlan {
    pub fn from_request(slot_id: Uuid, request: &AssignSlotRequest) -> ClinicResult<Self> {
        let name = required(request.name.as_deref(), "nombre")?;
        let surname = required(request.surname.as_deref(), "apellido")?;
        let session_count = if request.repeat {
            clamp_sessions(request.session_count.unwrap_or(1))
        } else {
            1
        };

        Ok(Self {
            slot_id,
            name,
            surname,
            base_datetime: request.datetime,
            location: request
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            session_count,
        })
    }
}

/// Clamps a requested session count to `1..=MAX_SESSIONS`.
pub fn clamp_sessions(requested: i64) -> u32 {
    requested.clamp(1, MAX_SESSIONS as i64) as u32
}

/// Instants of the copies `1..session_count`, each `i` weeks after `base` at the
/// same local time. `None` marks a week whose local time does not exist.
pub fn weekly_occurrences(
    base: DateTime<Utc>,
    session_count: u32,
    tz: Tz,
) -> Vec<Option<DateTime<Utc>>> {
    let local_base = base.with_timezone(&tz).naive_local();

    (1..session_count)
        .map(|week| {
            let local = local_base + Duration::weeks(week as i64);
            match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
                LocalResult::None => None,
            }
        })
        .collect()
}

/// Assigns the slot and generates its weekly copies atomically.
///
/// Returns the target slot followed by the copies, in creation order.
pub async fn assign_with_recurrence(
    store: &dyn Store,
    admin: AdminId,
    plan: &AssignmentPlan,
    tz: Tz,
    now: DateTime<Utc>,
) -> ClinicResult<Vec<Slot>> {
    let mut tx = store.begin().await?;
    let slots = assign_in_transaction(tx.as_mut(), admin, plan, tz, now).await?;
    tx.commit().await?;

    info!(
        "Slot {} assigned to {} {} with {} session(s)",
        plan.slot_id,
        plan.name,
        plan.surname,
        slots.len()
    );
    Ok(slots)
}

/// Body of [`assign_with_recurrence`], for callers that manage the transaction.
///
/// Any store failure aborts immediately; the caller must not commit after an error.
pub async fn assign_in_transaction(
    tx: &mut dyn StoreTransaction,
    admin: AdminId,
    plan: &AssignmentPlan,
    tz: Tz,
    now: DateTime<Utc>,
) -> ClinicResult<Vec<Slot>> {
    let mut slot = match tx.find_slot_for_update(plan.slot_id).await? {
        Some(slot) if slot.created_by == admin.0 => slot,
        _ => return Err(not_found(plan.slot_id)),
    };

    if slot.is_claimed() {
        return Err(ClinicError::InvalidState(format!(
            "Slot {} is already {:?}",
            slot.id,
            slot.state()
        )));
    }

    let assignment = Assignment {
        name: plan.name.clone(),
        surname: plan.surname.clone(),
        is_recurrence: false,
        origin_slot_id: None,
    };
    tx.save_assignment(slot.id, &assignment).await?;
    slot.assignment = Some(assignment);
    slot.available = false;

    let base = plan.base_datetime.unwrap_or(slot.datetime);
    let location = plan.location.clone().unwrap_or_else(|| slot.location.clone());
    let origin_id = slot.id;

    let mut created = vec![slot];
    for (week, occurrence) in weekly_occurrences(base, plan.session_count, tz)
        .into_iter()
        .enumerate()
    {
        let datetime = match occurrence {
            Some(datetime) if datetime >= now => datetime,
            Some(datetime) => {
                debug!("Skipping past recurrence: week={}, fecha={}", week + 1, datetime);
                continue;
            }
            None => {
                debug!("Skipping recurrence on nonexistent local time: week={}", week + 1);
                continue;
            }
        };

        let copy = tx
            .insert_slot(
                NewSlot {
                    datetime,
                    location: location.clone(),
                    created_by: admin.0,
                    assignment: Some(Assignment {
                        name: plan.name.clone(),
                        surname: plan.surname.clone(),
                        is_recurrence: true,
                        origin_slot_id: Some(origin_id),
                    }),
                },
                now,
            )
            .await?;
        created.push(copy);
    }

    Ok(created)
}
