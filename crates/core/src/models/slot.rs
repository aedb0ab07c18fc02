use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::form::number_or_text;

/// Location value that matches every site.
pub const WILDCARD_LOCATION: &str = "todas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "rechazada")]
    Rejected,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pendiente",
            ReservationStatus::Confirmed => "confirmada",
            ReservationStatus::Rejected => "rechazada",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pendiente" => Some(ReservationStatus::Pending),
            "confirmada" => Some(ReservationStatus::Confirmed),
            "rechazada" => Some(ReservationStatus::Rejected),
            _ => None,
        }
    }

    /// Pending and confirmed reservations hold the slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, ReservationStatus::Rejected)
    }
}

/// Final outcome an administrator can give a pending reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Rejected,
}

impl Decision {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "confirmada" => Some(Decision::Confirmed),
            "rechazada" => Some(Decision::Rejected),
            _ => None,
        }
    }

    pub fn status(&self) -> ReservationStatus {
        match self {
            Decision::Confirmed => ReservationStatus::Confirmed,
            Decision::Rejected => ReservationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "edad")]
    pub age: i32,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: Option<Uuid>,
    #[serde(rename = "estado")]
    pub status: ReservationStatus,
    #[serde(rename = "mensajeAdmin")]
    pub admin_message: Option<String>,
    #[serde(rename = "fechaReserva")]
    pub booked_at: DateTime<Utc>,
    #[serde(rename = "fechaActualizacion")]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "esRecurrencia")]
    pub is_recurrence: bool,
    #[serde(rename = "turnoOrigenId")]
    pub origin_slot_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    #[serde(rename = "fecha")]
    pub datetime: DateTime<Utc>,
    #[serde(rename = "sede")]
    pub location: String,
    #[serde(rename = "disponible")]
    pub available: bool,
    #[serde(rename = "createdBy")]
    pub created_by: Uuid,
    #[serde(rename = "asignacion")]
    pub assignment: Option<Assignment>,
    #[serde(rename = "reserva")]
    pub reservation: Option<Reservation>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Where a slot sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Open,
    /// Taken off public booking by its administrator without being claimed.
    Withdrawn,
    Pending,
    Confirmed,
    Assigned,
}

impl Slot {
    pub fn active_reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref().filter(|r| r.status.holds_slot())
    }

    /// A slot is claimed by an assignment or by a reservation that was not rejected.
    pub fn is_claimed(&self) -> bool {
        self.assignment.is_some() || self.active_reservation().is_some()
    }

    pub fn state(&self) -> SlotState {
        if self.assignment.is_some() {
            return SlotState::Assigned;
        }
        match self.active_reservation().map(|r| r.status) {
            Some(ReservationStatus::Pending) => SlotState::Pending,
            Some(_) => SlotState::Confirmed,
            None if self.available => SlotState::Open,
            None => SlotState::Withdrawn,
        }
    }

    /// A claimed slot is never available, and an available slot is never claimed.
    pub fn is_consistent(&self) -> bool {
        !(self.is_claimed() && self.available)
            && !(self.assignment.is_some() && self.active_reservation().is_some())
    }

    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.available && !self.is_claimed() && self.datetime >= now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub created_by: Uuid,
    pub assignment: Option<Assignment>,
}

/// Public booking request data, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub name: String,
    pub surname: String,
    pub age: i32,
    pub reason: String,
}

/// Which slots a location-scoped query should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFilter {
    All,
    Site(String),
}

impl LocationFilter {
    /// Missing, blank or wildcard values select every location.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(WILDCARD_LOCATION) => LocationFilter::All,
            Some(site) => LocationFilter::Site(site.to_string()),
        }
    }

    pub fn site(&self) -> Option<&str> {
        match self {
            LocationFilter::All => None,
            LocationFilter::Site(site) => Some(site),
        }
    }

    /// Slots opened for the wildcard location match every site.
    pub fn matches(&self, location: &str) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Site(site) => location == site || location == WILDCARD_LOCATION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    #[serde(rename = "fecha")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(rename = "sede")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSlotRequest {
    #[serde(rename = "turnoId")]
    pub slot_id: Option<Uuid>,
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub surname: Option<String>,
    #[serde(rename = "edad", default, deserialize_with = "number_or_text")]
    pub age: Option<i32>,
    #[serde(rename = "motivo")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSlotResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "turno")]
    pub slot: Slot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    #[serde(rename = "disponible")]
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideReservationRequest {
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "mensaje")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPatientRequest {
    #[serde(rename = "pacienteId")]
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignSlotRequest {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub surname: Option<String>,
    #[serde(rename = "repetirMensualmente", default)]
    pub repeat: bool,
    #[serde(rename = "numeroSesiones")]
    pub session_count: Option<i64>,
    #[serde(rename = "fecha")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(rename = "sede")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignSlotResponse {
    #[serde(rename = "turnos")]
    pub slots: Vec<Slot>,
    #[serde(rename = "sesionesCreadas")]
    pub sessions_created: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
