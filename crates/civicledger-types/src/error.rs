use thiserror::Error;

#[derive(Debug, Error)]
pub enum CivicError {
    #[error("Audit payload is not canonically serializable: {0}")]
    PayloadNotSerializable(String),

    #[error("Audit action label must not be empty")]
    EmptyAction,

    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Invalid application status: {0}")]
    InvalidStatus(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CivicError>;
