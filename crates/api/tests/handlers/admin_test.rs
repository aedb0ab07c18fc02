use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use turnos_api::middleware::auth::{self, hash_password};
use turnos_core::store::AdminStore;

use crate::test_utils::{JWT_SECRET, TestContext, bearer, now};

async fn context_with_login() -> TestContext {
    let ctx = TestContext::new().await;
    let hashed = hash_password("admin123").unwrap();
    ctx.store.insert_admin("admin", &hashed, now()).await.unwrap();
    ctx
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let ctx = context_with_login().await;

    let response = ctx
        .server
        .post("/api/admin/login")
        .json(&json!({ "username": "admin", "password": "admin123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let token = response.json::<Value>()["token"].as_str().unwrap().to_string();
    let claims = auth::decode_token(&token, JWT_SECRET, now()).unwrap();
    assert_eq!(claims.username, "admin");

    let (name, value) = bearer(&token);
    let listed = ctx.server.get("/api/admin/turnos").add_header(name, value).await;
    assert_eq!(listed.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = context_with_login().await;

    for (username, password) in [("admin", "wrong"), ("nadie", "admin123")] {
        let response = ctx
            .server
            .post("/api/admin/login")
            .json(&json!({ "username": username, "password": password }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>(), json!({ "error": "Invalid credentials" }));
    }
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/admin/pacientes").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({ "error": "No token provided" }));

    let (name, value) = bearer("garbage");
    let response = ctx.server.get("/api/admin/pacientes").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn test_token_of_unknown_admin_is_rejected() {
    let ctx = TestContext::new().await;
    let other = TestContext::new().await;

    // Signed with the same secret, but the admin only exists in the other store
    let (name, value) = other.auth();
    let response = ctx.server.get("/api/admin/turnos").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({ "error": "Admin not found" }));
}

#[tokio::test]
async fn test_health_reports_clinic_timezone() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timezone"], "America/Argentina/Buenos_Aires");
}
