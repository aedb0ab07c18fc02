//! # Patient Record Manager
//!
//! Patient profiles, their medical notes, and the cascade that releases every
//! reservation linked to a patient before the record is removed.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::patient::{
        CreatePatientRequest, MedicalNote, NewPatient, Patient, PatientChanges,
    },
    services::{optional, required},
    store::Store,
};

fn not_found(id: Uuid) -> ClinicError {
    ClinicError::NotFound(format!("Patient with ID {} not found", id))
}

fn check_measurements(age: Option<i32>, height: Option<f64>, weight: Option<f64>) -> ClinicResult<()> {
    if matches!(age, Some(a) if a < 0) {
        return Err(ClinicError::Validation("edad must not be negative".to_string()));
    }
    if matches!(height, Some(h) if h.is_nan() || h <= 0.0) {
        return Err(ClinicError::Validation("altura must be positive".to_string()));
    }
    if matches!(weight, Some(w) if w.is_nan() || w <= 0.0) {
        return Err(ClinicError::Validation("peso must be positive".to_string()));
    }
    Ok(())
}

pub fn validate_new_patient(request: CreatePatientRequest) -> ClinicResult<NewPatient> {
    let mut missing = Vec::new();
    for (value, field) in [
        (&request.name, "nombre"),
        (&request.surname, "apellido"),
        (&request.national_id, "dni"),
    ] {
        if required(value.as_deref(), field).is_err() {
            missing.push(field);
        }
    }
    if !missing.is_empty() {
        return Err(ClinicError::Validation(format!(
            "Faltan campos requeridos: {}",
            missing.join(", ")
        )));
    }

    check_measurements(request.age, request.height, request.weight)?;

    Ok(NewPatient {
        name: required(request.name.as_deref(), "nombre")?,
        surname: required(request.surname.as_deref(), "apellido")?,
        national_id: required(request.national_id.as_deref(), "dni")?,
        age: request.age,
        height: request.height,
        weight: request.weight,
        phone: optional(request.phone),
        email: optional(request.email),
    })
}

pub async fn create_patient(
    store: &dyn Store,
    request: CreatePatientRequest,
    now: DateTime<Utc>,
) -> ClinicResult<Patient> {
    let patient = store.insert_patient(validate_new_patient(request)?, now).await?;
    debug!("Patient created: id={}", patient.id);
    Ok(patient)
}

pub async fn list_patients(store: &dyn Store) -> ClinicResult<Vec<Patient>> {
    store.list_patients().await
}

pub async fn get_patient(store: &dyn Store, id: Uuid) -> ClinicResult<Patient> {
    store.find_patient(id).await?.ok_or_else(|| not_found(id))
}

/// Applies a partial update. Required fields may be changed but not blanked;
/// a blank `telefono` or `email` clears it.
///
/// The record stays locked from read to write, so concurrent updates apply one
/// after the other.
pub async fn update_patient(
    store: &dyn Store,
    id: Uuid,
    changes: PatientChanges,
    now: DateTime<Utc>,
) -> ClinicResult<Patient> {
    let changes = PatientChanges {
        name: changes.name.map(|v| required(Some(&v), "nombre")).transpose()?,
        surname: changes.surname.map(|v| required(Some(&v), "apellido")).transpose()?,
        national_id: changes.national_id.map(|v| required(Some(&v), "dni")).transpose()?,
        phone: changes.phone.map(|v| v.trim().to_string()),
        email: changes.email.map(|v| v.trim().to_string()),
        ..changes
    };
    check_measurements(changes.age, changes.height, changes.weight)?;

    let mut tx = store.begin().await?;
    let mut patient = tx
        .find_patient_for_update(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    changes.apply_to(&mut patient);

    let saved = tx
        .save_patient(&patient, now)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    debug!("Patient {} updated", id);
    Ok(saved)
}

/// Deletes a patient after releasing every slot reserved under them.
///
/// Both steps share one transaction. Should the store offer weaker guarantees,
/// the order still leaves no dangling reference: slots are released first.
pub async fn delete_patient(store: &dyn Store, id: Uuid) -> ClinicResult<bool> {
    let mut tx = store.begin().await?;

    if tx.find_patient_for_update(id).await?.is_none() {
        return Ok(false);
    }

    let released = tx.release_patient_reservations(id).await?;
    let deleted = tx.delete_patient(id).await?;
    tx.commit().await?;

    info!("Patient {} deleted, {} slot(s) released", id, released);
    Ok(deleted)
}

pub async fn add_note(
    store: &dyn Store,
    patient_id: Uuid,
    content: Option<&str>,
    now: DateTime<Utc>,
) -> ClinicResult<MedicalNote> {
    let content = required(content, "contenido")?;
    store
        .append_note(patient_id, &content, now)
        .await?
        .ok_or_else(|| not_found(patient_id))
}

/// Notes of a patient, newest first.
pub async fn get_notes(store: &dyn Store, patient_id: Uuid) -> ClinicResult<Vec<MedicalNote>> {
    get_patient(store, patient_id).await?;
    store.list_notes(patient_id).await
}
