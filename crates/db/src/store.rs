//! PostgreSQL implementation of the store traits.
//!
//! Every single-row operation is one statement, so the reservation claim is
//! atomic at the row level. [`PgStoreTransaction`] wraps a `sqlx` transaction:
//! `*_for_update` reads take row locks and dropping it rolls back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::eyre;
use sqlx::{Postgres, Transaction};
use turnos_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        admin::Admin,
        patient::{MedicalNote, NewPatient, Patient},
        slot::{
            Assignment, LocationFilter, NewSlot, ReservationRequest, ReservationStatus, Slot,
        },
    },
    store::{AdminStore, PatientStore, SlotStore, StoreTransaction, TransactionalStore},
};
use uuid::Uuid;

use crate::{
    DbPool,
    models::DbSlot,
    repositories::{admin, patient, slot},
};

/// Turns a repository error into a domain error, recognising unique violations.
fn db_error(report: eyre::Report) -> ClinicError {
    let constraint = report
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .filter(|e| e.is_unique_violation())
        .map(|e| e.constraint().unwrap_or_default().to_string());

    match constraint {
        Some(c) if c.contains("national_id") => {
            ClinicError::DuplicateKey("Ya existe un paciente con ese DNI".to_string())
        }
        Some(c) if c.contains("username") => {
            ClinicError::DuplicateKey("Admin username already exists".to_string())
        }
        Some(c) => ClinicError::DuplicateKey(format!("Duplicate value violates {}", c)),
        None => ClinicError::Store(report),
    }
}

fn to_slot(row: DbSlot) -> ClinicResult<Slot> {
    Ok(Slot::try_from(row)?)
}

fn to_slots(rows: Vec<DbSlot>) -> ClinicResult<Vec<Slot>> {
    rows.into_iter().map(to_slot).collect()
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SlotStore for PgStore {
    async fn insert_slot(&self, new: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot> {
        let row = slot::insert_slot(&self.pool, &new, now).await.map_err(db_error)?;
        to_slot(row)
    }

    async fn find_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>> {
        slot::get_slot_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn find_open(
        &self,
        location: &LocationFilter,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> ClinicResult<Vec<Slot>> {
        let rows = slot::get_open_slots(&self.pool, location.site(), from, until)
            .await
            .map_err(db_error)?;
        to_slots(rows)
    }

    async fn find_by_owner(&self, owner: Uuid) -> ClinicResult<Vec<Slot>> {
        let rows = slot::get_slots_by_owner(&self.pool, owner).await.map_err(db_error)?;
        to_slots(rows)
    }

    async fn delete_slot(&self, id: Uuid, owner: Uuid) -> ClinicResult<bool> {
        let deleted = slot::delete_slot(&self.pool, id, owner).await.map_err(db_error)?;
        Ok(deleted > 0)
    }

    async fn update_availability(
        &self,
        id: Uuid,
        available: bool,
        owner: Uuid,
    ) -> ClinicResult<Option<Slot>> {
        slot::set_availability(&self.pool, id, available, owner)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn claim_slot(
        &self,
        id: Uuid,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>> {
        slot::claim_slot(&self.pool, id, request, now)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn decide_reservation(
        &self,
        id: Uuid,
        status: ReservationStatus,
        admin_message: Option<&str>,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>> {
        let release = status == ReservationStatus::Rejected;
        slot::decide_reservation(&self.pool, id, status.as_str(), release, admin_message, now)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn list_pending(&self) -> ClinicResult<Vec<Slot>> {
        let rows = slot::get_pending_slots(&self.pool).await.map_err(db_error)?;
        to_slots(rows)
    }
}

#[async_trait]
impl PatientStore for PgStore {
    async fn insert_patient(&self, new: NewPatient, now: DateTime<Utc>) -> ClinicResult<Patient> {
        let row = patient::create_patient(&self.pool, &new, now).await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn list_patients(&self) -> ClinicResult<Vec<Patient>> {
        let rows = patient::get_patients(&self.pool).await.map_err(db_error)?;
        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<Patient>> {
        let row = patient::get_patient_by_id(&self.pool, id).await.map_err(db_error)?;
        Ok(row.map(Patient::from))
    }

    async fn append_note(
        &self,
        patient_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<MedicalNote>> {
        let row = patient::create_note(&self.pool, patient_id, content, now)
            .await
            .map_err(db_error)?;
        Ok(row.map(MedicalNote::from))
    }

    async fn list_notes(&self, patient_id: Uuid) -> ClinicResult<Vec<MedicalNote>> {
        let rows = patient::get_notes_by_patient_id(&self.pool, patient_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(MedicalNote::from).collect())
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn insert_admin(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Admin> {
        let row = admin::create_admin(&self.pool, username, password_hash, now)
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn find_admin_by_username(&self, username: &str) -> ClinicResult<Option<Admin>> {
        let row = admin::get_admin_by_username(&self.pool, username)
            .await
            .map_err(db_error)?;
        Ok(row.map(Admin::from))
    }
}

#[async_trait]
impl TransactionalStore for PgStore {
    async fn begin(&self) -> ClinicResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| db_error(e.into()))?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn find_slot_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Slot>> {
        slot::lock_slot(&mut *self.tx, id)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn save_assignment(&mut self, id: Uuid, assignment: &Assignment) -> ClinicResult<()> {
        let updated = slot::save_assignment(&mut *self.tx, id, assignment)
            .await
            .map_err(db_error)?;
        if updated == 0 {
            return Err(ClinicError::Store(eyre!("slot {} vanished inside its transaction", id)));
        }
        Ok(())
    }

    async fn insert_slot(&mut self, new: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot> {
        let row = slot::insert_slot(&mut *self.tx, &new, now).await.map_err(db_error)?;
        to_slot(row)
    }

    async fn find_patient_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Patient>> {
        let row = patient::lock_patient(&mut *self.tx, id).await.map_err(db_error)?;
        Ok(row.map(Patient::from))
    }

    async fn save_patient(&mut self, record: &Patient, now: DateTime<Utc>) -> ClinicResult<Option<Patient>> {
        let row = patient::update_patient(&mut *self.tx, record, now)
            .await
            .map_err(db_error)?;
        Ok(row.map(Patient::from))
    }

    async fn release_patient_reservations(&mut self, patient_id: Uuid) -> ClinicResult<u64> {
        slot::release_patient_reservations(&mut *self.tx, patient_id)
            .await
            .map_err(db_error)
    }

    async fn delete_patient(&mut self, id: Uuid) -> ClinicResult<bool> {
        let deleted = patient::delete_patient(&mut *self.tx, id).await.map_err(db_error)?;
        Ok(deleted > 0)
    }

    async fn link_reservation_patient(
        &mut self,
        id: Uuid,
        patient_id: Uuid,
    ) -> ClinicResult<Option<Slot>> {
        slot::link_reservation_patient(&mut *self.tx, id, patient_id)
            .await
            .map_err(db_error)?
            .map(to_slot)
            .transpose()
    }

    async fn commit(self: Box<Self>) -> ClinicResult<()> {
        self.tx.commit().await.map_err(|e| db_error(e.into()))
    }
}
