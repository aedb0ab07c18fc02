use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The slot was already claimed, is in the past, or does not exist.
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    /// Unknown id, or an id owned by another administrator.
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Store error: {0}")]
    Store(#[from] eyre::Report),
}

impl ClinicError {
    /// Whether the error was caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ClinicError::Store(_))
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
