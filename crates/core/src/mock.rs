use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::{
    errors::ClinicResult,
    models::{
        patient::Patient,
        slot::{Assignment, NewSlot, Slot},
    },
    store::StoreTransaction,
};

// Mock transaction for testing failure paths the in-memory store cannot produce
mock! {
    pub Transaction {}

    #[async_trait]
    impl StoreTransaction for Transaction {
        async fn find_slot_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Slot>>;

        async fn save_assignment(&mut self, id: Uuid, assignment: &Assignment) -> ClinicResult<()>;

        async fn insert_slot(&mut self, slot: NewSlot, now: DateTime<Utc>) -> ClinicResult<Slot>;

        async fn find_patient_for_update(&mut self, id: Uuid) -> ClinicResult<Option<Patient>>;

        async fn save_patient(&mut self, patient: &Patient, now: DateTime<Utc>) -> ClinicResult<Option<Patient>>;

        async fn release_patient_reservations(&mut self, patient_id: Uuid) -> ClinicResult<u64>;

        async fn delete_patient(&mut self, id: Uuid) -> ClinicResult<bool>;

        async fn link_reservation_patient(
            &mut self,
            id: Uuid,
            patient_id: Uuid,
        ) -> ClinicResult<Option<Slot>>;

        async fn commit(self: Box<Self>) -> ClinicResult<()>;
    }
}
