//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies. Store failures
//! are logged here and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};
use turnos_core::errors::ClinicError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use turnos_api::middleware::error_handling::AppError;
/// use turnos_core::errors::ClinicError;
///
/// async fn handler(sede: Option<String>) -> Result<Json<String>, AppError> {
///     let sede = sede.ok_or_else(|| ClinicError::Validation("sede is required".into()))?;
///     Ok(Json(sede))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ClinicError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::SlotUnavailable(_)
            | ClinicError::InvalidState(_)
            | ClinicError::DuplicateKey(_) => StatusCode::CONFLICT,
            ClinicError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Client errors carry their own message; the cause of a store error stays in the log
        let message = match self.0 {
            ClinicError::Validation(message)
            | ClinicError::Authentication(message)
            | ClinicError::NotFound(message)
            | ClinicError::SlotUnavailable(message)
            | ClinicError::InvalidState(message)
            | ClinicError::DuplicateKey(message) => message,
            ClinicError::Store(report) => {
                error!("Store failure: {:?}", report);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Allows `?` on `ClinicResult` inside handlers.
impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ClinicError::Store(err))
    }
}

/// A body that is not valid JSON or does not fit the request type.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        AppError(ClinicError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(ClinicError::Validation(rejection.body_text()))
    }
}

/// Path ids that are not UUIDs.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(ClinicError::Validation(rejection.body_text()))
    }
}

/// Maps a ClinicError to an HTTP response
pub fn map_error(err: ClinicError) -> Response {
    AppError(err).into_response()
}
