//! Row types as stored in PostgreSQL, and their conversion into domain models.

use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnos_core::models::{
    admin::Admin,
    patient::{MedicalNote, Patient},
    slot::{Assignment, Reservation, ReservationStatus, Slot},
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAdmin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatient {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub national_id: String,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMedicalNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub available: bool,
    pub created_by: Uuid,
    pub asg_name: Option<String>,
    pub asg_surname: Option<String>,
    pub asg_is_recurrence: Option<bool>,
    pub asg_origin_slot_id: Option<Uuid>,
    pub res_name: Option<String>,
    pub res_surname: Option<String>,
    pub res_age: Option<i32>,
    pub res_reason: Option<String>,
    pub res_patient_id: Option<Uuid>,
    pub res_status: Option<String>,
    pub res_admin_message: Option<String>,
    pub res_booked_at: Option<DateTime<Utc>>,
    pub res_decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbAdmin> for Admin {
    fn from(row: DbAdmin) -> Self {
        Admin {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

impl From<DbPatient> for Patient {
    fn from(row: DbPatient) -> Self {
        Patient {
            id: row.id,
            name: row.name,
            surname: row.surname,
            national_id: row.national_id,
            age: row.age,
            height: row.height,
            weight: row.weight,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbMedicalNote> for MedicalNote {
    fn from(row: DbMedicalNote) -> Self {
        MedicalNote {
            content: row.content,
            created_at: row.created_at,
        }
    }
}

impl DbSlot {
    fn assignment(&self) -> Option<Assignment> {
        let (name, surname) = (self.asg_name.clone()?, self.asg_surname.clone()?);
        Some(Assignment {
            name,
            surname,
            is_recurrence: self.asg_is_recurrence.unwrap_or(false),
            origin_slot_id: self.asg_origin_slot_id,
        })
    }

    fn reservation(&self) -> Result<Option<Reservation>> {
        let Some(status) = self.res_status.as_deref() else {
            return Ok(None);
        };
        let status = ReservationStatus::parse(status)
            .ok_or_else(|| eyre!("Slot {} has unknown reservation status '{}'", self.id, status))?;
        let incomplete = || eyre!("Slot {} has an incomplete reservation row", self.id);

        Ok(Some(Reservation {
            name: self.res_name.clone().ok_or_else(incomplete)?,
            surname: self.res_surname.clone().ok_or_else(incomplete)?,
            age: self.res_age.ok_or_else(incomplete)?,
            reason: self.res_reason.clone().ok_or_else(incomplete)?,
            patient_id: self.res_patient_id,
            status,
            admin_message: self.res_admin_message.clone(),
            booked_at: self.res_booked_at.ok_or_else(incomplete)?,
            decided_at: self.res_decided_at,
        }))
    }
}

impl TryFrom<DbSlot> for Slot {
    type Error = eyre::Report;

    fn try_from(row: DbSlot) -> Result<Self> {
        let reservation = row.reservation()?;
        let assignment = row.assignment();

        Ok(Slot {
            id: row.id,
            datetime: row.starts_at,
            location: row.location,
            available: row.available,
            created_by: row.created_by,
            assignment,
            reservation,
            created_at: row.created_at,
        })
    }
}
