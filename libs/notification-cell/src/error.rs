use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for NotificationError {
    fn from(e: anyhow::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => AppError::NotFound(e.to_string()),
            NotificationError::ValidationError(msg) => AppError::ValidationError(msg),
            NotificationError::Forbidden(msg) => AppError::Forbidden(msg),
            NotificationError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
