//! # Authentication Module
//!
//! Administrator credentials and tokens.
//!
//! Passwords are stored as Argon2 PHC strings. A successful login yields an
//! HS256 JWT whose subject is the administrator id; admin routes take an
//! [`AdminIdentity`] extractor that checks the `Authorization: Bearer` header
//! and resolves the administrator the request acts for.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use turnos_core::{
    errors::ClinicError,
    models::admin::{Admin, AdminId},
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Hashes a password using the Argon2 algorithm
///
/// Returns the hash in PHC string format, which carries its own salt and
/// parameters.
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a password against a stored PHC hash. A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_token(admin: &Admin, secret: &str, now: DateTime<Utc>, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: admin.id,
        username: admin.username.clone(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| eyre::eyre!("Failed to encode JWT: {}", e))?;

    Ok(token)
}

/// Verifies the signature and checks expiry against `now`.
pub fn decode_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, ClinicError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked against the injected clock below
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            ClinicError::Authentication("Invalid token".to_string())
        })?;

    if claims.exp <= now.timestamp() {
        debug!("Token expired at {} (now: {})", claims.exp, now.timestamp());
        return Err(ClinicError::Authentication("Token expired".to_string()));
    }

    Ok(claims)
}

/// Authenticated administrator on whose behalf the request runs.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub id: AdminId,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = |message: &str| AppError(ClinicError::Authentication(message.to_string()));

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| unauthorized("No token provided"))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| unauthorized("Invalid authorization header format"))?;

        let claims = decode_token(token, &state.jwt_secret, state.clock.now())?;

        // The administrator may have been removed since the token was issued
        state
            .store
            .find_admin_by_username(&claims.username)
            .await?
            .filter(|admin| admin.id == claims.sub)
            .ok_or_else(|| unauthorized("Admin not found"))?;

        Ok(AdminIdentity {
            id: AdminId(claims.sub),
            username: claims.username,
        })
    }
}
