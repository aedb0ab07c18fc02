use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::form::number_or_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalNote {
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "fecha")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "dni")]
    pub national_id: String,
    #[serde(rename = "edad")]
    pub age: Option<i32>,
    #[serde(rename = "altura")]
    pub height: Option<f64>,
    #[serde(rename = "peso")]
    pub weight: Option<f64>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fecha_actualizacion")]
    pub updated_at: DateTime<Utc>,
}

/// Validated data for a new patient record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub surname: String,
    pub national_id: String,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched and an empty
/// `telefono` or `email` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientChanges {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub surname: Option<String>,
    #[serde(rename = "dni")]
    pub national_id: Option<String>,
    #[serde(rename = "edad", default, deserialize_with = "number_or_text")]
    pub age: Option<i32>,
    #[serde(rename = "altura", default, deserialize_with = "number_or_text")]
    pub height: Option<f64>,
    #[serde(rename = "peso", default, deserialize_with = "number_or_text")]
    pub weight: Option<f64>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PatientChanges {
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(surname) = self.surname {
            patient.surname = surname;
        }
        if let Some(national_id) = self.national_id {
            patient.national_id = national_id;
        }
        if self.age.is_some() {
            patient.age = self.age;
        }
        if self.height.is_some() {
            patient.height = self.height;
        }
        if self.weight.is_some() {
            patient.weight = self.weight;
        }
        if let Some(phone) = self.phone {
            patient.phone = Some(phone).filter(|p| !p.is_empty());
        }
        if let Some(email) = self.email {
            patient.email = Some(email).filter(|e| !e.is_empty());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub surname: Option<String>,
    #[serde(rename = "dni")]
    pub national_id: Option<String>,
    #[serde(rename = "edad", default, deserialize_with = "number_or_text")]
    pub age: Option<i32>,
    #[serde(rename = "altura", default, deserialize_with = "number_or_text")]
    pub height: Option<f64>,
    #[serde(rename = "peso", default, deserialize_with = "number_or_text")]
    pub weight: Option<f64>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientResponse {
    pub success: bool,
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPatientResponse {
    #[serde(rename = "paciente")]
    pub patient: Patient,
    #[serde(rename = "notas")]
    pub notes: Vec<MedicalNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteRequest {
    #[serde(rename = "contenido")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNoteResponse {
    pub message: String,
    #[serde(rename = "nota")]
    pub note: MedicalNote,
}
