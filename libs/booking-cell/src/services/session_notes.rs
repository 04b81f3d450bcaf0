use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument};

use shared_database::PostgrestClient;

use crate::error::BookingError;
use crate::models::{Booking, SessionNote};

pub struct SessionNoteService {
    db: Arc<PostgrestClient>,
}

impl SessionNoteService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn get_note(&self, booking_id: &str) -> Result<Option<SessionNote>, BookingError> {
        let path = format!(
            "/rest/v1/session_notes?booking_id=eq.{}",
            urlencoding::encode(booking_id)
        );
        Ok(self.db.select_one(&path).await?)
    }

    /// Attaches the note for `booking`. A booking has at most one note.
    #[instrument(skip(self, booking, content), fields(booking_id = %booking.booking_id))]
    pub async fn create_note(&self, booking: &Booking, content: &str) -> Result<SessionNote, BookingError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(BookingError::ValidationError("content must not be empty".to_string()));
        }

        if self.get_note(&booking.booking_id).await?.is_some() {
            return Err(BookingError::NoteAlreadyExists(booking.booking_id.clone()));
        }

        let row = json!({
            "booking_id": booking.booking_id,
            "therapist_id": booking.therapist_id,
            "client_id": booking.client_id,
            "content": content,
        });

        let stored: Vec<SessionNote> = self.db.insert("session_notes", row).await?;
        let note = stored
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::DatabaseError("Insert returned no session note row".to_string()))?;

        info!("Session note {} attached to booking {}", note.id, note.booking_id);
        Ok(note)
    }
}
