/// Password hashing, admin tokens and the admin identity extractor
pub mod auth;
/// Mapping of domain errors to HTTP responses
pub mod error_handling;
/// Body, query and path extractors that reject through `AppError`
pub mod extract;
