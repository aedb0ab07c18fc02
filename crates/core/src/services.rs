//! Domain operations over the [`Store`](crate::store::Store) interfaces.
//!
//! Every function takes the current instant explicitly, and every admin-scoped
//! function takes the acting [`AdminId`](crate::models::admin::AdminId).

pub mod availability;
pub mod patients;
pub mod recurrence;
pub mod reservation;
pub mod slots;

use crate::errors::{ClinicError, ClinicResult};

/// Trims a required text field, rejecting missing or blank values.
pub(crate) fn required(value: Option<&str>, field: &str) -> ClinicResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ClinicError::Validation(format!("{} is required", field))),
    }
}

/// Trims an optional text field, mapping blank values to `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
