//! # Request Extractors
//!
//! Wrappers over axum's `Json`, `Query` and `Path` whose rejections go through
//! [`AppError`], so a malformed body, query or id is answered like any other
//! validation error: `400` with a JSON `{"error": ...}` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::middleware::error_handling::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
