//! # Store Interfaces
//!
//! The services in this crate never talk to a database directly. They run against
//! these traits, which the PostgreSQL crate and the in-memory store implement.
//!
//! Single-document operations are methods on the store itself. Operations that
//! touch several documents run inside a [`StoreTransaction`] obtained from
//! [`TransactionalStore::begin`]: nothing is visible to other callers until
//! [`StoreTransaction::commit`] succeeds, and dropping an uncommitted transaction
//! discards every change made through it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::ClinicResult;
use crate::models::{
    admin::Admin,
    patient::{MedicalNote, NewPatient, Patient},
    slot::{Assignment, LocationFilter, NewSlot, ReservationRequest, ReservationStatus, Slot},
};

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn insert_slot(&self, slot: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot>;

    async fn find_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>>;

    /// Available slots with `from <= datetime` (and `datetime < until` when given),
    /// ascending by datetime.
    async fn find_open(
        &self,
        location: &LocationFilter,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> ClinicResult<Vec<Slot>>;

    /// Every slot opened by `owner`, ascending by datetime.
    async fn find_by_owner(&self, owner: Uuid) -> ClinicResult<Vec<Slot>>;

    /// Returns false when no slot with this id belongs to `owner`.
    async fn delete_slot(&self, id: Uuid, owner: Uuid) -> ClinicResult<bool>;

    /// Sets the flag on an unclaimed slot owned by `owner`.
    ///
    /// Returns `None` when the slot is missing, foreign or claimed.
    async fn update_availability(
        &self,
        id: Uuid,
        available: bool,
        owner: Uuid,
    ) -> ClinicResult<Option<Slot>>;

    /// Single conditional update: matches `id`, `available = true` and
    /// `datetime >= now`, then marks the slot unavailable and attaches a pending
    /// reservation. Concurrent callers for the same slot get at most one `Some`.
    async fn claim_slot(
        &self,
        id: Uuid,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>>;

    /// Moves a pending reservation to `status`. A rejection also releases the slot.
    ///
    /// Returns `None` when the slot has no pending reservation.
    async fn decide_reservation(
        &self,
        id: Uuid,
        status: ReservationStatus,
        admin_message: Option<&str>,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>>;

    /// Slots whose reservation is pending, most recent booking first.
    async fn list_pending(&self) -> ClinicResult<Vec<Slot>>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn insert_patient(&self, patient: NewPatient, now: DateTime<Utc>) -> ClinicResult<Patient>;

    /// All patients ordered by surname, then name.
    async fn list_patients(&self) -> ClinicResult<Vec<Patient>>;

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<Patient>>;

    /// Returns `None` if the patient does not exist.
    async fn append_note(
        &self,
        patient_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<MedicalNote>>;

    /// Notes of a patient, newest first.
    async fn list_notes(&self, patient_id: Uuid) -> ClinicResult<Vec<MedicalNote>>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn insert_admin(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Admin>;

    async fn find_admin_by_username(&self, username: &str) -> ClinicResult<Option<Admin>>;
}

#[async_trait]
pub trait TransactionalStore: Send + Sync {
    async fn begin(&self) -> ClinicResult<Box<dyn StoreTransaction>>;
}

/// Unit of work over several documents. Rolled back on drop unless committed.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Loads a slot and holds it against concurrent writers until the transaction ends.
    async fn find_slot_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Slot>>;

    /// Attaches the assignment and marks the slot unavailable.
    async fn save_assignment(&mut self, id: Uuid, assignment: &Assignment) -> ClinicResult<()>;

    async fn insert_slot(&mut self, slot: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot>;

    async fn find_patient_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Patient>>;

    /// Overwrites the stored profile. Returns `None` if the patient no longer exists.
    async fn save_patient(&mut self, patient: &Patient, now: DateTime<Utc>) -> ClinicResult<Option<Patient>>;

    /// Removes the reservation from every slot linked to the patient and makes
    /// those slots available again. Returns the number of slots released.
    async fn release_patient_reservations(&mut self, patient_id: Uuid) -> ClinicResult<u64>;

    async fn delete_patient(&mut self, id: Uuid) -> ClinicResult<bool>;

    /// Links the active reservation of a slot to a patient record.
    ///
    /// Returns `None` when the slot has no pending or confirmed reservation.
    async fn link_reservation_patient(
        &mut self,
        id: Uuid,
        patient_id: Uuid,
    ) -> ClinicResult<Option<Slot>>;

    async fn commit(self: Box<Self>) -> ClinicResult<()>;
}

/// Everything the services need from persistence.
pub trait Store: SlotStore + PatientStore + AdminStore + TransactionalStore {}

impl<T> Store for T where T: SlotStore + PatientStore + AdminStore + TransactionalStore {}
