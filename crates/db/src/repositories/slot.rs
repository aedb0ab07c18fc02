use crate::models::DbSlot;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use turnos_core::models::slot::{Assignment, NewSlot, ReservationRequest, WILDCARD_LOCATION};
use uuid::Uuid;

/// Matches slots not held by an assignment or by a live reservation.
const UNCLAIMED: &str = "asg_name IS NULL AND (res_status IS NULL OR res_status = 'rechazada')";

pub async fn insert_slot<'e, E: PgExecutor<'e>>(
    executor: E,
    slot: &NewSlot,
    now: DateTime<Utc>,
) -> Result<DbSlot> {
    let id = Uuid::new_v4();
    let assignment = slot.assignment.as_ref();

    tracing::debug!(
        "Creating slot: id={}, sede={}, fecha={}, assigned={}",
        id, slot.location, slot.datetime, assignment.is_some()
    );

    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        INSERT INTO slots (
            id, starts_at, location, available, created_by,
            asg_name, asg_surname, asg_is_recurrence, asg_origin_slot_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(slot.datetime)
    .bind(&slot.location)
    .bind(assignment.is_none())
    .bind(slot.created_by)
    .bind(assignment.map(|a| a.name.as_str()))
    .bind(assignment.map(|a| a.surname.as_str()))
    .bind(assignment.map(|a| a.is_recurrence))
    .bind(assignment.and_then(|a| a.origin_slot_id))
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(slot)
}

pub async fn get_slot_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>("SELECT * FROM slots WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(slot)
}

/// Row-locks the slot until the surrounding transaction ends.
pub async fn lock_slot<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>("SELECT * FROM slots WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(slot)
}

/// Available slots in `[from, until)`. A `site` also matches wildcard slots.
pub async fn get_open_slots<'e, E: PgExecutor<'e>>(
    executor: E,
    site: Option<&str>,
    from: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT *
        FROM slots
        WHERE available = TRUE
          AND starts_at >= $1
          AND ($2::timestamptz IS NULL OR starts_at < $2)
          AND ($3::varchar IS NULL OR location = $3 OR location = $4)
        ORDER BY starts_at ASC
        "#,
    )
    .bind(from)
    .bind(until)
    .bind(site)
    .bind(WILDCARD_LOCATION)
    .fetch_all(executor)
    .await?;

    Ok(slots)
}

pub async fn get_slots_by_owner<'e, E: PgExecutor<'e>>(executor: E, owner: Uuid) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT *
        FROM slots
        WHERE created_by = $1
        ORDER BY starts_at ASC
        "#,
    )
    .bind(owner)
    .fetch_all(executor)
    .await?;

    Ok(slots)
}

pub async fn delete_slot<'e, E: PgExecutor<'e>>(executor: E, id: Uuid, owner: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM slots WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(owner)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn set_availability<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    available: bool,
    owner: Uuid,
) -> Result<Option<DbSlot>> {
    let query = format!(
        "UPDATE slots SET available = $2 WHERE id = $1 AND created_by = $3 AND {} RETURNING *",
        UNCLAIMED
    );
    let slot = sqlx::query_as::<_, DbSlot>(&query)
        .bind(id)
        .bind(available)
        .bind(owner)
        .fetch_optional(executor)
        .await?;

    Ok(slot)
}

/// Conditional claim: only an available, future, unclaimed slot is updated.
pub async fn claim_slot<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    request: &ReservationRequest,
    now: DateTime<Utc>,
) -> Result<Option<DbSlot>> {
    let query = format!(
        r#"
        UPDATE slots
        SET available = FALSE,
            res_name = $2,
            res_surname = $3,
            res_age = $4,
            res_reason = $5,
            res_patient_id = NULL,
            res_status = 'pendiente',
            res_admin_message = NULL,
            res_booked_at = $6,
            res_decided_at = NULL
        WHERE id = $1
          AND available = TRUE
          AND starts_at >= $6
          AND {}
        RETURNING *
        "#,
        UNCLAIMED
    );
    let slot = sqlx::query_as::<_, DbSlot>(&query)
        .bind(id)
        .bind(&request.name)
        .bind(&request.surname)
        .bind(request.age)
        .bind(&request.reason)
        .bind(now)
        .fetch_optional(executor)
        .await?;

    Ok(slot)
}

pub async fn decide_reservation<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    status: &str,
    release: bool,
    admin_message: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        UPDATE slots
        SET res_status = $2,
            res_admin_message = $3,
            res_decided_at = $4,
            available = available OR $5
        WHERE id = $1 AND res_status = 'pendiente'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(admin_message)
    .bind(now)
    .bind(release)
    .fetch_optional(executor)
    .await?;

    Ok(slot)
}

pub async fn get_pending_slots<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT *
        FROM slots
        WHERE res_status = 'pendiente'
        ORDER BY res_booked_at DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(slots)
}

pub async fn save_assignment<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    assignment: &Assignment,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE slots
        SET available = FALSE,
            asg_name = $2,
            asg_surname = $3,
            asg_is_recurrence = $4,
            asg_origin_slot_id = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&assignment.name)
    .bind(&assignment.surname)
    .bind(assignment.is_recurrence)
    .bind(assignment.origin_slot_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Clears every reservation linked to the patient. Slots without an assignment
/// become available again.
pub async fn release_patient_reservations<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE slots
        SET available = (asg_name IS NULL),
            res_name = NULL,
            res_surname = NULL,
            res_age = NULL,
            res_reason = NULL,
            res_patient_id = NULL,
            res_status = NULL,
            res_admin_message = NULL,
            res_booked_at = NULL,
            res_decided_at = NULL
        WHERE res_patient_id = $1
        "#,
    )
    .bind(patient_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn link_reservation_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    patient_id: Uuid,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        UPDATE slots
        SET res_patient_id = $2
        WHERE id = $1 AND res_status IN ('pendiente', 'confirmada')
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patient_id)
    .fetch_optional(executor)
    .await?;

    Ok(slot)
}
