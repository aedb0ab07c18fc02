use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{info, warn};
use turnos_core::{
    errors::ClinicError,
    models::admin::{LoginRequest, LoginResponse},
};

use crate::{
    ApiState,
    middleware::{auth, error_handling::AppError, extract::AppJson},
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let admin = state
        .store
        .find_admin_by_username(&payload.username)
        .await?
        .filter(|admin| auth::verify_password(&payload.password, &admin.password_hash));

    let Some(admin) = admin else {
        warn!("Failed login attempt for username={}", payload.username);
        return Err(ClinicError::Authentication("Invalid credentials".to_string()).into());
    };

    let token = auth::issue_token(&admin, &state.jwt_secret, state.clock.now(), state.token_ttl)?;
    info!("Admin logged in: username={}", admin.username);

    Ok(Json(LoginResponse { token }))
}
