use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AuditError {
    fn from(e: anyhow::Error) -> Self {
        AuditError::DatabaseError(e.to_string())
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::ValidationError(msg) => AppError::ValidationError(msg),
            AuditError::Forbidden(msg) => AppError::Forbidden(msg),
            AuditError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
