use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use turnos_core::models::slot::{AssignSlotResponse, ReserveSlotResponse, Slot, SlotState};

use crate::test_utils::{TestContext, in_days};

fn booking(slot_id: uuid::Uuid) -> Value {
    json!({
        "turnoId": slot_id,
        "nombre": "Lucía",
        "apellido": "Fernández",
        "edad": 29,
        "motivo": "Dolor lumbar"
    })
}

#[tokio::test]
async fn test_reserve_slot_returns_created_reservation() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;

    let response = ctx.server.post("/api/turnos").json(&booking(slot.id)).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<ReserveSlotResponse>();
    assert!(body.success);
    assert_eq!(body.message, "Turno reservado exitosamente");
    assert_eq!(body.slot.id, slot.id);
    assert!(!body.slot.available);
    assert_eq!(body.slot.state(), SlotState::Pending);

    let raw = ctx.server.get("/api/admin/turnos/reservas/pendientes");
    let (name, value) = ctx.auth();
    let pending = raw.add_header(name, value).await.json::<Vec<Slot>>();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].reservation.as_ref().unwrap().name, "Lucía");
}

#[tokio::test]
async fn test_second_reservation_conflicts() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;

    let first = ctx.server.post("/api/turnos").json(&booking(slot.id)).await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = ctx.server.post("/api/turnos").json(&booking(slot.id)).await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        second.json::<Value>(),
        json!({ "error": "El turno seleccionado ya no está disponible" })
    );
}

#[tokio::test]
async fn test_reservation_with_missing_fields_is_rejected() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;

    let response = ctx
        .server
        .post("/api/turnos")
        .json(&json!({ "turnoId": slot.id, "nombre": "Lucía" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Faltan datos requeridos para la reserva" })
    );
}

#[tokio::test]
async fn test_admin_slot_lifecycle() {
    let ctx = TestContext::new().await;

    let (name, value) = ctx.auth();
    let created = ctx
        .server
        .post("/api/admin/turnos")
        .add_header(name, value)
        .json(&json!({ "fecha": in_days(5), "sede": "norte" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let slot = created.json::<Slot>();
    assert!(slot.available);
    assert_eq!(slot.created_by, ctx.admin.id);

    let (name, value) = ctx.auth();
    let withdrawn = ctx
        .server
        .patch(&format!("/api/admin/turnos/{}/disponibilidad", slot.id))
        .add_header(name, value)
        .json(&json!({ "disponible": false }))
        .await;
    assert_eq!(withdrawn.status_code(), StatusCode::OK);
    assert_eq!(
        withdrawn.json::<Value>()["message"],
        "Disponibilidad actualizada exitosamente"
    );

    let public = ctx.server.get("/api/turnos/disponibles").await.json::<Vec<Slot>>();
    assert!(public.is_empty());

    let (name, value) = ctx.auth();
    let deleted = ctx
        .server
        .delete(&format!("/api/admin/turnos/{}", slot.id))
        .add_header(name, value)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>()["message"], "Turno eliminado exitosamente");

    let (name, value) = ctx.auth();
    let again = ctx
        .server
        .delete(&format!("/api/admin/turnos/{}", slot.id))
        .add_header(name, value)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_slot_requires_location() {
    let ctx = TestContext::new().await;

    let (name, value) = ctx.auth();
    let response = ctx
        .server
        .post("/api/admin/turnos")
        .add_header(name, value)
        .json(&json!({ "fecha": in_days(5), "sede": "  " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_then_decide_again_conflicts() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;
    ctx.server.post("/api/turnos").json(&booking(slot.id)).await;

    let path = format!("/api/admin/turnos/{}/reserva/estado", slot.id);
    let (name, value) = ctx.auth();
    let confirmed = ctx
        .server
        .patch(&path)
        .add_header(name, value)
        .json(&json!({ "estado": "confirmada", "mensaje": "Lo esperamos" }))
        .await;
    assert_eq!(confirmed.status_code(), StatusCode::OK);

    let slot = confirmed.json::<Slot>();
    let reservation = slot.reservation.as_ref().unwrap();
    assert_eq!(slot.state(), SlotState::Confirmed);
    assert_eq!(reservation.admin_message.as_deref(), Some("Lo esperamos"));
    assert!(reservation.decided_at.is_some());

    let (name, value) = ctx.auth();
    let again = ctx
        .server
        .patch(&path)
        .add_header(name, value)
        .json(&json!({ "estado": "rechazada" }))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejection_reopens_slot_for_booking() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;
    ctx.server.post("/api/turnos").json(&booking(slot.id)).await;

    let (name, value) = ctx.auth();
    let rejected = ctx
        .server
        .patch(&format!("/api/admin/turnos/{}/reserva/estado", slot.id))
        .add_header(name, value)
        .json(&json!({ "estado": "rechazada" }))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::OK);
    assert!(rejected.json::<Slot>().available);

    let rebooked = ctx.server.post("/api/turnos").json(&booking(slot.id)).await;
    assert_eq!(rebooked.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unknown_decision_conflicts() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;
    ctx.server.post("/api/turnos").json(&booking(slot.id)).await;

    let (name, value) = ctx.auth();
    let response = ctx
        .server
        .patch(&format!("/api/admin/turnos/{}/reserva/estado", slot.id))
        .add_header(name, value)
        .json(&json!({ "estado": "pendiente" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_assign_with_weekly_repeats() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(2), "sur").await;

    let (name, value) = ctx.auth();
    let response = ctx
        .server
        .put(&format!("/api/admin/turnos/{}/asignar", slot.id))
        .add_header(name, value)
        .json(&json!({
            "nombre": "Marta",
            "apellido": "Ruiz",
            "repetirMensualmente": true,
            "numeroSesiones": 4
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<AssignSlotResponse>();
    assert_eq!(body.sessions_created, 4);
    assert_eq!(body.slots[0].id, slot.id);
    for (week, copy) in body.slots.iter().enumerate() {
        let assignment = copy.assignment.as_ref().unwrap();
        assert_eq!(copy.datetime, slot.datetime + chrono::Duration::weeks(week as i64));
        assert_eq!(copy.location, "sur");
        assert!(!copy.available);
        assert_eq!(assignment.is_recurrence, week > 0);
    }
    assert_eq!(body.slots[3].assignment.as_ref().unwrap().origin_slot_id, Some(slot.id));

    let (name, value) = ctx.auth();
    let own = ctx.server.get("/api/admin/turnos").add_header(name, value).await;
    assert_eq!(own.json::<Vec<Slot>>().len(), 4);
}

#[tokio::test]
async fn test_assign_reserved_slot_conflicts() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(2), "sur").await;
    ctx.server.post("/api/turnos").json(&booking(slot.id)).await;

    let (name, value) = ctx.auth();
    let response = ctx
        .server
        .put(&format!("/api/admin/turnos/{}/asignar", slot.id))
        .add_header(name, value)
        .json(&json!({ "nombre": "Marta", "apellido": "Ruiz" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_link_reservation_to_patient() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;
    ctx.server.post("/api/turnos").json(&booking(slot.id)).await;

    let (name, value) = ctx.auth();
    let created = ctx
        .server
        .post("/api/admin/pacientes")
        .add_header(name, value)
        .json(&json!({ "nombre": "Lucía", "apellido": "Fernández", "dni": "30111222" }))
        .await;
    let patient_id = created.json::<Value>()["id"].as_str().unwrap().to_string();

    let (name, value) = ctx.auth();
    let linked = ctx
        .server
        .patch(&format!("/api/admin/turnos/{}/reserva/paciente", slot.id))
        .add_header(name, value)
        .json(&json!({ "pacienteId": patient_id }))
        .await;
    assert_eq!(linked.status_code(), StatusCode::OK);

    let reservation = linked.json::<Slot>().reservation.unwrap();
    assert_eq!(reservation.patient_id.map(|id| id.to_string()), Some(patient_id));
}

#[tokio::test]
async fn test_reservation_accepts_age_as_form_text() {
    let ctx = TestContext::new().await;
    let slot = ctx.open_slot(in_days(3), "centro").await;

    let response = ctx
        .server
        .post("/api/turnos")
        .json(&json!({
            "turnoId": slot.id,
            "nombre": "Lucía",
            "apellido": "Fernández",
            "edad": "29",
            "motivo": "Dolor lumbar"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let reservation = response.json::<ReserveSlotResponse>().slot.reservation.unwrap();
    assert_eq!(reservation.age, 29);
}

#[rstest]
#[case::bad_slot_id(json!({ "turnoId": "not-a-uuid", "nombre": "Lucía", "apellido": "Fernández", "edad": 29, "motivo": "Control" }))]
#[case::non_numeric_age(json!({ "turnoId": uuid::Uuid::new_v4(), "nombre": "Lucía", "apellido": "Fernández", "edad": "veinte", "motivo": "Control" }))]
#[case::not_an_object(json!(["Lucía"]))]
#[tokio::test]
async fn test_malformed_reservation_body_is_validation_error(#[case] body: Value) {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/api/turnos").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_non_json_body_is_validation_error() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/api/turnos").text("nombre=Lucía").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_malformed_slot_id_in_path_is_validation_error() {
    let ctx = TestContext::new().await;

    let (name, value) = ctx.auth();
    let response = ctx
        .server
        .delete("/api/admin/turnos/turno-7")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}
