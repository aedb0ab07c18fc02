use crate::models::{DbMedicalNote, DbPatient};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use turnos_core::models::patient::{NewPatient, Patient};
use uuid::Uuid;

pub async fn create_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    patient: &NewPatient,
    now: DateTime<Utc>,
) -> Result<DbPatient> {
    let id = Uuid::new_v4();

    let patient = sqlx::query_as::<_, DbPatient>(
        r#"
        INSERT INTO patients (
            id, name, surname, national_id, age, height, weight, phone, email,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patient.name)
    .bind(&patient.surname)
    .bind(&patient.national_id)
    .bind(patient.age)
    .bind(patient.height)
    .bind(patient.weight)
    .bind(patient.phone.as_deref())
    .bind(patient.email.as_deref())
    .bind(now)
    .fetch_one(executor)
    .await?;

    tracing::debug!("Patient created: id={}", id);
    Ok(patient)
}

pub async fn get_patients<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<DbPatient>> {
    let patients = sqlx::query_as::<_, DbPatient>(
        r#"
        SELECT *
        FROM patients
        ORDER BY surname ASC, name ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(patients)
}

pub async fn get_patient_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbPatient>> {
    let patient = sqlx::query_as::<_, DbPatient>("SELECT * FROM patients WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(patient)
}

/// Row-locks the patient until the surrounding transaction ends.
pub async fn lock_patient<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbPatient>> {
    let patient = sqlx::query_as::<_, DbPatient>("SELECT * FROM patients WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(patient)
}

pub async fn update_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    patient: &Patient,
    now: DateTime<Utc>,
) -> Result<Option<DbPatient>> {
    let updated = sqlx::query_as::<_, DbPatient>(
        r#"
        UPDATE patients
        SET name = $2,
            surname = $3,
            national_id = $4,
            age = $5,
            height = $6,
            weight = $7,
            phone = $8,
            email = $9,
            updated_at = $10
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(patient.id)
    .bind(&patient.name)
    .bind(&patient.surname)
    .bind(&patient.national_id)
    .bind(patient.age)
    .bind(patient.height)
    .bind(patient.weight)
    .bind(patient.phone.as_deref())
    .bind(patient.email.as_deref())
    .bind(now)
    .fetch_optional(executor)
    .await?;

    Ok(updated)
}

/// Notes go with the patient through `ON DELETE CASCADE`.
pub async fn delete_patient<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM patients WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Inserts nothing and returns `None` when the patient does not exist.
pub async fn create_note<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Option<DbMedicalNote>> {
    let note = sqlx::query_as::<_, DbMedicalNote>(
        r#"
        INSERT INTO medical_notes (id, patient_id, content, created_at)
        SELECT $1, $2, $3, $4
        WHERE EXISTS (SELECT 1 FROM patients WHERE id = $2)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(patient_id)
    .bind(content)
    .bind(now)
    .fetch_optional(executor)
    .await?;

    Ok(note)
}

pub async fn get_notes_by_patient_id<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
) -> Result<Vec<DbMedicalNote>> {
    let notes = sqlx::query_as::<_, DbMedicalNote>(
        r#"
        SELECT *
        FROM medical_notes
        WHERE patient_id = $1
        ORDER BY created_at DESC, seq DESC
        "#,
    )
    .bind(patient_id)
    .fetch_all(executor)
    .await?;

    Ok(notes)
}
