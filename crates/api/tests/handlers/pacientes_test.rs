use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use turnos_core::models::{
    patient::{CreatePatientResponse, GetPatientResponse, MedicalNote, Patient},
    slot::Slot,
};
use uuid::Uuid;

use crate::test_utils::{TestContext, in_days};

async fn create_patient(ctx: &TestContext, name: &str, surname: &str, dni: &str) -> Uuid {
    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .post("/api/admin/pacientes")
        .add_header(header, value)
        .json(&json!({
            "nombre": name,
            "apellido": surname,
            "dni": dni,
            "edad": 52,
            "telefono": "11-4444-1234"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<CreatePatientResponse>();
    assert!(body.success);
    assert_eq!(body.message, "Paciente creado exitosamente");
    body.id
}

#[tokio::test]
async fn test_create_and_fetch_patient() {
    let ctx = TestContext::new().await;
    let id = create_patient(&ctx, "Jorge", "Sosa", "20333444").await;

    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .get(&format!("/api/admin/pacientes/{}", id))
        .add_header(header, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<GetPatientResponse>();
    assert_eq!(body.patient.name, "Jorge");
    assert_eq!(body.patient.national_id, "20333444");
    assert_eq!(body.patient.age, Some(52));
    assert!(body.notes.is_empty());
}

#[tokio::test]
async fn test_patients_are_listed_by_surname() {
    let ctx = TestContext::new().await;
    create_patient(&ctx, "Jorge", "Sosa", "1").await;
    create_patient(&ctx, "Elena", "Acosta", "2").await;
    create_patient(&ctx, "Bruno", "Molina", "3").await;

    let (header, value) = ctx.auth();
    let patients = ctx
        .server
        .get("/api/admin/pacientes")
        .add_header(header, value)
        .await
        .json::<Vec<Patient>>();

    let surnames: Vec<_> = patients.iter().map(|p| p.surname.as_str()).collect();
    assert_eq!(surnames, vec!["Acosta", "Molina", "Sosa"]);
}

#[tokio::test]
async fn test_create_patient_validation() {
    let ctx = TestContext::new().await;

    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .post("/api/admin/pacientes")
        .add_header(header, value)
        .json(&json!({ "nombre": "Jorge" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Faltan campos requeridos: apellido, dni" })
    );
}

#[tokio::test]
async fn test_duplicate_national_id_conflicts() {
    let ctx = TestContext::new().await;
    create_patient(&ctx, "Jorge", "Sosa", "20333444").await;

    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .post("/api/admin/pacientes")
        .add_header(header, value)
        .json(&json!({ "nombre": "Otro", "apellido": "Sosa", "dni": "20333444" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Ya existe un paciente con ese DNI" })
    );
}

#[tokio::test]
async fn test_update_patient_keeps_unsent_fields() {
    let ctx = TestContext::new().await;
    let id = create_patient(&ctx, "Jorge", "Sosa", "20333444").await;

    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .put(&format!("/api/admin/pacientes/{}", id))
        .add_header(header, value)
        .json(&json!({ "peso": 81.5, "email": "jorge@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let patient = response.json::<Patient>();
    assert_eq!(patient.name, "Jorge");
    assert_eq!(patient.phone.as_deref(), Some("11-4444-1234"));
    assert_eq!(patient.weight, Some(81.5));
    assert_eq!(patient.email.as_deref(), Some("jorge@example.com"));
}

#[tokio::test]
async fn test_notes_are_added_and_listed() {
    let ctx = TestContext::new().await;
    let id = create_patient(&ctx, "Jorge", "Sosa", "20333444").await;
    let path = format!("/api/admin/pacientes/{}/notas", id);

    let (header, value) = ctx.auth();
    let added = ctx
        .server
        .post(&path)
        .add_header(header, value)
        .json(&json!({ "contenido": "Primera consulta, derivado a kinesiología" }))
        .await;
    assert_eq!(added.status_code(), StatusCode::OK);
    assert_eq!(added.json::<Value>()["message"], "Nota agregada exitosamente");

    let (header, value) = ctx.auth();
    let blank = ctx
        .server
        .post(&path)
        .add_header(header, value)
        .json(&json!({ "contenido": "   " }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let (header, value) = ctx.auth();
    let notes = ctx.server.get(&path).add_header(header, value).await.json::<Vec<MedicalNote>>();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "Primera consulta, derivado a kinesiología");

    let (header, value) = ctx.auth();
    let missing = ctx
        .server
        .post(&format!("/api/admin/pacientes/{}/notas", Uuid::new_v4()))
        .add_header(header, value)
        .json(&json!({ "contenido": "Nota" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_patient_releases_reservation() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(4), "centro").await;
    ctx.server
        .post("/api/turnos")
        .json(&json!({
            "turnoId": slot.id,
            "nombre": "Jorge",
            "apellido": "Sosa",
            "edad": 52,
            "motivo": "Control"
        }))
        .await;
    let id = create_patient(&ctx, "Jorge", "Sosa", "20333444").await;

    let (header, value) = ctx.auth();
    ctx.server
        .patch(&format!("/api/admin/turnos/{}/reserva/paciente", slot.id))
        .add_header(header, value)
        .json(&json!({ "pacienteId": id }))
        .await;

    let (header, value) = ctx.auth();
    let deleted = ctx
        .server
        .delete(&format!("/api/admin/pacientes/{}", id))
        .add_header(header, value)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>()["message"], "Paciente eliminado exitosamente");

    let open = ctx.server.get("/api/turnos/disponibles").await.json::<Vec<Slot>>();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, slot.id);
    assert!(open[0].reservation.is_none());

    let (header, value) = ctx.auth();
    let again = ctx
        .server
        .delete(&format!("/api/admin/pacientes/{}", id))
        .add_header(header, value)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(again.json::<Value>(), json!({ "error": "Paciente no encontrado" }));
}

#[tokio::test]
async fn test_update_patient_clears_phone_and_reads_form_numbers() {
    let ctx = TestContext::new().await;
    let id = create_patient(&ctx, "Jorge", "Sosa", "20333444").await;

    let (header, value) = ctx.auth();
    let response = ctx
        .server
        .put(&format!("/api/admin/pacientes/{}", id))
        .add_header(header, value)
        .json(&json!({ "telefono": "", "edad": "53" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let patient = response.json::<Patient>();
    assert_eq!(patient.phone, None);
    assert_eq!(patient.age, Some(53));
    assert_eq!(patient.surname, "Sosa");
}
