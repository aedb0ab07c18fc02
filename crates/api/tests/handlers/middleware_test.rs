use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use turnos_api::middleware::error_handling::{AppError, map_error};
use turnos_core::errors::ClinicError;

async fn body_of(error: ClinicError) -> (StatusCode, Value) {
    let response = map_error(error);
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[rstest]
#[case::validation(ClinicError::Validation("x".into()), StatusCode::BAD_REQUEST)]
#[case::authentication(ClinicError::Authentication("x".into()), StatusCode::UNAUTHORIZED)]
#[case::not_found(ClinicError::NotFound("x".into()), StatusCode::NOT_FOUND)]
#[case::slot_unavailable(ClinicError::SlotUnavailable("x".into()), StatusCode::CONFLICT)]
#[case::invalid_state(ClinicError::InvalidState("x".into()), StatusCode::CONFLICT)]
#[case::duplicate_key(ClinicError::DuplicateKey("x".into()), StatusCode::CONFLICT)]
#[tokio::test]
async fn test_client_errors_keep_their_message(#[case] error: ClinicError, #[case] expected: StatusCode) {
    let (status, body) = body_of(error).await;

    assert_eq!(status, expected);
    assert_eq!(body, json!({ "error": "x" }));
}

#[test_log::test(tokio::test)]
async fn test_store_error_hides_cause() {
    let error = ClinicError::Store(eyre::eyre!("connection refused to 10.0.0.5:5432"));

    let (status, body) = body_of(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[test]
fn test_eyre_report_becomes_store_error() {
    let error: AppError = eyre::eyre!("pool timed out").into();

    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(matches!(error.0, ClinicError::Store(_)));
}
