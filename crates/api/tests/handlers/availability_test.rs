use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use turnos_core::models::slot::Slot;

use crate::test_utils::{TestContext, in_days};

/// Two late-evening slots that fall on different days in UTC and in Buenos Aires.
async fn seed(ctx: &TestContext) {
    // 2025-03-01 22:30 in Buenos Aires
    ctx.open_slot(Utc.with_ymd_and_hms(2025, 3, 2, 1, 30, 0).unwrap(), "centro")
        .await;
    ctx.open_slot(Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap(), "todas")
        .await;
    ctx.open_slot(Utc.with_ymd_and_hms(2025, 3, 18, 13, 0, 0).unwrap(), "norte")
        .await;
    // Already gone
    ctx.open_slot(Utc.with_ymd_and_hms(2025, 2, 27, 13, 0, 0).unwrap(), "centro")
        .await;
}

#[rstest]
#[case::every_site(None, json!(["2025-03-01", "2025-03-10", "2025-03-18"]))]
#[case::centro(Some("centro"), json!(["2025-03-01", "2025-03-10"]))]
#[case::wildcard(Some("todas"), json!(["2025-03-01", "2025-03-10", "2025-03-18"]))]
#[case::unknown_site(Some("oeste"), json!(["2025-03-10"]))]
#[tokio::test]
async fn test_available_days_by_site(#[case] sede: Option<&str>, #[case] expected: Value) {
    let ctx = TestContext::new().await;
    seed(&ctx).await;

    let mut request = ctx.server.get("/api/dias-disponibles").add_query_param("mes", "2025-03");
    if let Some(sede) = sede {
        request = request.add_query_param("sede", sede);
    }
    let response = request.await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), expected);
}

#[tokio::test]
async fn test_available_days_follow_clinic_timezone() {
    let ctx = TestContext::with_timezone(chrono_tz::UTC).await;
    seed(&ctx).await;

    let response = ctx
        .server
        .get("/api/dias-disponibles")
        .add_query_param("mes", "2025-03")
        .add_query_param("sede", "centro")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!(["2025-03-02", "2025-03-10"]));
}

#[tokio::test]
async fn test_available_days_for_past_month_is_empty() {
    let ctx = TestContext::new().await;
    seed(&ctx).await;

    let response = ctx
        .server
        .get("/api/dias-disponibles")
        .add_query_param("mes", "2025-02")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_available_days_requires_month() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/dias-disponibles").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "mes is required" }));
}

#[rstest]
#[case::word("marzo")]
#[case::month_out_of_range("2025-13")]
#[case::reversed("03-2025")]
#[tokio::test]
async fn test_available_days_rejects_malformed_month(#[case] mes: &str) {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/dias-disponibles")
        .add_query_param("mes", mes)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_open_slots_excludes_claimed_and_past() {
    let ctx = TestContext::new().await;
    seed(&ctx).await;
    let booked = ctx.open_slot(in_days(1), "centro").await;
    ctx.server
        .post("/api/turnos")
        .json(&json!({
            "turnoId": booked.id,
            "nombre": "Ana",
            "apellido": "Paz",
            "edad": 40,
            "motivo": "Control"
        }))
        .await;

    let slots = ctx
        .server
        .get("/api/turnos/disponibles")
        .add_query_param("sede", "centro")
        .await
        .json::<Vec<Slot>>();

    let locations: Vec<_> = slots.iter().map(|s| s.location.as_str()).collect();
    assert_eq!(locations, vec!["centro", "todas"]);
    assert!(slots.windows(2).all(|w| w[0].datetime <= w[1].datetime));
}
