use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Booking {0} already exists")]
    AlreadyExists(String),

    #[error("Session note already exists for booking {0}")]
    NoteAlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Paperform link is not configured")]
    PaperformNotConfigured,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for BookingError {
    fn from(e: anyhow::Error) -> Self {
        BookingError::DatabaseError(e.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::NotFound(_) => AppError::NotFound(e.to_string()),
            BookingError::AlreadyExists(_) | BookingError::NoteAlreadyExists(_) => {
                AppError::Conflict(e.to_string())
            }
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingError::Forbidden(msg) => AppError::Forbidden(msg),
            BookingError::PaperformNotConfigured => AppError::Internal(e.to_string()),
            BookingError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
