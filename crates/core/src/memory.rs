//! In-process implementation of the [`store`](crate::store) traits.
//!
//! State lives behind one async mutex. Single operations take the lock for their
//! duration, which makes [`SlotStore::claim_slot`] atomic. A transaction holds
//! the lock until it is committed or dropped and works on a private copy, so an
//! uncommitted transaction leaves no trace.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::{
        admin::Admin,
        patient::{MedicalNote, NewPatient, Patient},
        slot::{
            Assignment, LocationFilter, NewSlot, Reservation, ReservationRequest,
            ReservationStatus, Slot,
        },
    },
    store::{AdminStore, PatientStore, SlotStore, StoreTransaction, TransactionalStore},
};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    slots: Vec<Slot>,
    patients: HashMap<Uuid, Patient>,
    notes: HashMap<Uuid, Vec<MedicalNote>>,
    admins: Vec<Admin>,
}

impl MemoryState {
    fn slot_mut(&mut self, id: Uuid) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    fn insert_slot(&mut self, slot: NewSlot, now: DateTime<Utc>) -> Slot {
        let slot = Slot {
            id: Uuid::new_v4(),
            datetime: slot.datetime,
            location: slot.location,
            available: slot.assignment.is_none(),
            created_by: slot.created_by,
            assignment: slot.assignment,
            reservation: None,
            created_at: now,
        };
        self.slots.push(slot.clone());
        slot
    }

    fn check_unique_national_id(&self, national_id: &str, except: Option<Uuid>) -> ClinicResult<()> {
        let taken = self
            .patients
            .values()
            .any(|p| p.national_id == national_id && Some(p.id) != except);
        if taken {
            return Err(ClinicError::DuplicateKey(
                "Ya existe un paciente con ese DNI".to_string(),
            ));
        }
        Ok(())
    }

    fn release_patient_reservations(&mut self, patient_id: Uuid) -> u64 {
        let mut released = 0;
        for slot in self.slots.iter_mut() {
            let linked = slot
                .reservation
                .as_ref()
                .is_some_and(|r| r.patient_id == Some(patient_id));
            if linked {
                slot.reservation = None;
                slot.available = slot.assignment.is_none();
                released += 1;
            }
        }
        released
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored slot, in insertion order.
    pub async fn all_slots(&self) -> Vec<Slot> {
        self.state.lock().await.slots.clone()
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn insert_slot(&self, slot: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot> {
        Ok(self.state.lock().await.insert_slot(slot, now))
    }

    async fn find_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>> {
        let state = self.state.lock().await;
        Ok(state.slots.iter().find(|s| s.id == id).cloned())
    }

    async fn find_open(
        &self,
        location: &LocationFilter,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> ClinicResult<Vec<Slot>> {
        let state = self.state.lock().await;
        let mut slots: Vec<Slot> = state
            .slots
            .iter()
            .filter(|s| s.available && s.datetime >= from)
            .filter(|s| until.is_none_or(|until| s.datetime < until))
            .filter(|s| location.matches(&s.location))
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.datetime);
        Ok(slots)
    }

    async fn find_by_owner(&self, owner: Uuid) -> ClinicResult<Vec<Slot>> {
        let state = self.state.lock().await;
        let mut slots: Vec<Slot> = state
            .slots
            .iter()
            .filter(|s| s.created_by == owner)
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.datetime);
        Ok(slots)
    }

    async fn delete_slot(&self, id: Uuid, owner: Uuid) -> ClinicResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.slots.len();
        state.slots.retain(|s| !(s.id == id && s.created_by == owner));
        Ok(state.slots.len() < before)
    }

    async fn update_availability(
        &self,
        id: Uuid,
        available: bool,
        owner: Uuid,
    ) -> ClinicResult<Option<Slot>> {
        let mut state = self.state.lock().await;
        Ok(state
            .slot_mut(id)
            .filter(|s| s.created_by == owner && !s.is_claimed())
            .map(|slot| {
                slot.available = available;
                slot.clone()
            }))
    }

    async fn claim_slot(
        &self,
        id: Uuid,
        request: &ReservationRequest,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>> {
        let mut state = self.state.lock().await;
        Ok(state
            .slot_mut(id)
            .filter(|s| s.available && s.datetime >= now && !s.is_claimed())
            .map(|slot| {
                slot.available = false;
                slot.reservation = Some(Reservation {
                    name: request.name.clone(),
                    surname: request.surname.clone(),
                    age: request.age,
                    reason: request.reason.clone(),
                    patient_id: None,
                    status: ReservationStatus::Pending,
                    admin_message: None,
                    booked_at: now,
                    decided_at: None,
                });
                slot.clone()
            }))
    }

    async fn decide_reservation(
        &self,
        id: Uuid,
        status: ReservationStatus,
        admin_message: Option<&str>,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<Slot>> {
        let mut state = self.state.lock().await;
        let Some(slot) = state.slot_mut(id) else {
            return Ok(None);
        };
        let Some(reservation) = slot
            .reservation
            .as_mut()
            .filter(|r| r.status == ReservationStatus::Pending)
        else {
            return Ok(None);
        };

        reservation.status = status;
        reservation.admin_message = admin_message.map(str::to_string);
        reservation.decided_at = Some(now);
        if status == ReservationStatus::Rejected {
            slot.available = true;
        }
        Ok(Some(slot.clone()))
    }

    async fn list_pending(&self) -> ClinicResult<Vec<Slot>> {
        let state = self.state.lock().await;
        let mut slots: Vec<Slot> = state
            .slots
            .iter()
            .filter(|s| {
                s.reservation
                    .as_ref()
                    .is_some_and(|r| r.status == ReservationStatus::Pending)
            })
            .cloned()
            .collect();
        slots.sort_by_key(|s| std::cmp::Reverse(s.reservation.as_ref().map(|r| r.booked_at)));
        Ok(slots)
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn insert_patient(&self, patient: NewPatient, now: DateTime<Utc>) -> ClinicResult<Patient> {
        let mut state = self.state.lock().await;
        state.check_unique_national_id(&patient.national_id, None)?;

        let patient = Patient {
            id: Uuid::new_v4(),
            name: patient.name,
            surname: patient.surname,
            national_id: patient.national_id,
            age: patient.age,
            height: patient.height,
            weight: patient.weight,
            phone: patient.phone,
            email: patient.email,
            created_at: now,
            updated_at: now,
        };
        state.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn list_patients(&self) -> ClinicResult<Vec<Patient>> {
        let state = self.state.lock().await;
        let mut patients: Vec<Patient> = state.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.surname.cmp(&b.surname).then_with(|| a.name.cmp(&b.name)));
        Ok(patients)
    }

    async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<Patient>> {
        Ok(self.state.lock().await.patients.get(&id).cloned())
    }

    async fn append_note(
        &self,
        patient_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Option<MedicalNote>> {
        let mut state = self.state.lock().await;
        if !state.patients.contains_key(&patient_id) {
            return Ok(None);
        }

        let note = MedicalNote {
            content: content.to_string(),
            created_at: now,
        };
        state.notes.entry(patient_id).or_default().push(note.clone());
        Ok(Some(note))
    }

    async fn list_notes(&self, patient_id: Uuid) -> ClinicResult<Vec<MedicalNote>> {
        let state = self.state.lock().await;
        let mut notes: Vec<MedicalNote> = state
            .notes
            .get(&patient_id)
            .map(|notes| notes.iter().rev().cloned().collect())
            .unwrap_or_default();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert_admin(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ClinicResult<Admin> {
        let mut state = self.state.lock().await;
        if state.admins.iter().any(|a| a.username == username) {
            return Err(ClinicError::DuplicateKey(format!(
                "Admin {} already exists",
                username
            )));
        }

        let admin = Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        };
        state.admins.push(admin.clone());
        Ok(admin)
    }

    async fn find_admin_by_username(&self, username: &str) -> ClinicResult<Option<Admin>> {
        let state = self.state.lock().await;
        Ok(state.admins.iter().find(|a| a.username == username).cloned())
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn begin(&self) -> ClinicResult<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

/// Holds the store lock; changes land in `working` and are published on commit.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn find_slot_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Slot>> {
        Ok(self.working.slots.iter().find(|s| s.id == id).cloned())
    }

    async fn save_assignment(&mut self, id: Uuid, assignment: &Assignment) -> ClinicResult<()> {
        let slot = self
            .working
            .slot_mut(id)
            .ok_or_else(|| eyre::eyre!("slot {} vanished inside its transaction", id))?;
        slot.assignment = Some(assignment.clone());
        slot.available = false;
        Ok(())
    }

    async fn insert_slot(&mut self, slot: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot> {
        Ok(self.working.insert_slot(slot, now))
    }

    async fn find_patient_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Patient>> {
        Ok(self.working.patients.get(&id).cloned())
    }

    async fn save_patient(&mut self, patient: &Patient, now: DateTime<Utc>) -> ClinicResult<Option<Patient>> {
        if !self.working.patients.contains_key(&patient.id) {
            return Ok(None);
        }
        self.working
            .check_unique_national_id(&patient.national_id, Some(patient.id))?;

        let mut saved = patient.clone();
        saved.updated_at = now;
        self.working.patients.insert(saved.id, saved.clone());
        Ok(Some(saved))
    }

    async fn release_patient_reservations(&mut self, patient_id: Uuid) -> ClinicResult<u64> {
        Ok(self.working.release_patient_reservations(patient_id))
    }

    async fn delete_patient(&mut self, id: Uuid) -> ClinicResult<bool> {
        self.working.notes.remove(&id);
        Ok(self.working.patients.remove(&id).is_some())
    }

    async fn link_reservation_patient(
        &mut self,
        id: Uuid,
        patient_id: Uuid,
    ) -> ClinicResult<Option<Slot>> {
        let Some(slot) = self.working.slot_mut(id) else {
            return Ok(None);
        };
        match slot.reservation.as_mut().filter(|r| r.status.holds_slot()) {
            Some(reservation) => {
                reservation.patient_id = Some(patient_id);
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn commit(self: Box<Self>) -> ClinicResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
