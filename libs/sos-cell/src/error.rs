use thiserror::Error;

use shared_models::error::AppError;

use crate::models::SosStatus;

#[derive(Error, Debug)]
pub enum SosError {
    #[error("SOS assessment not found: {0}")]
    AssessmentNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Documentation link not found")]
    TokenNotFound,

    #[error("Documentation link has expired")]
    TokenExpired,

    #[error("Documentation link has been revoked")]
    TokenRevoked,

    #[error("SOS cannot be raised for this booking: {0}")]
    NotEligible(String),

    #[error("Cannot move assessment from {from} to {to}")]
    InvalidTransition { from: SosStatus, to: SosStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for SosError {
    fn from(e: anyhow::Error) -> Self {
        SosError::DatabaseError(e.to_string())
    }
}

impl From<booking_cell::BookingError> for SosError {
    fn from(e: booking_cell::BookingError) -> Self {
        match e {
            booking_cell::BookingError::NotFound(id) => SosError::BookingNotFound(id),
            other => SosError::DatabaseError(other.to_string()),
        }
    }
}

impl From<SosError> for AppError {
    fn from(e: SosError) -> Self {
        match e {
            SosError::AssessmentNotFound(_) | SosError::BookingNotFound(_) | SosError::TokenNotFound => {
                AppError::NotFound(e.to_string())
            }
            SosError::TokenExpired | SosError::TokenRevoked => AppError::Forbidden(e.to_string()),
            SosError::NotEligible(_) => AppError::BadRequest(e.to_string()),
            SosError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            SosError::ValidationError(msg) => AppError::ValidationError(msg),
            SosError::Forbidden(msg) => AppError::Forbidden(msg),
            SosError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
