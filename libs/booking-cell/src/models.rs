use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_rules::clock::serde_practice_timestamp;
use booking_rules::{
    derive_effective_status, parse_invitee_time, EffectiveStatus, RawBookingStatus, RefundStatus,
    StatusSignals,
};

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub booking_status: Option<String>,
    #[serde(default)]
    pub refund_status: Option<String>,
    #[serde(default, with = "serde_practice_timestamp")]
    pub booking_start_at: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_practice_timestamp")]
    pub booking_end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub booking_invitee_time: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub therapist_id: Option<Uuid>,
    #[serde(default)]
    pub therapist_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn raw_status(&self) -> RawBookingStatus {
        RawBookingStatus::parse(self.booking_status.as_deref())
    }

    pub fn refund(&self) -> RefundStatus {
        RefundStatus::parse(self.refund_status.as_deref())
    }

    pub fn status_signals(&self, has_session_note: bool) -> StatusSignals<'_> {
        StatusSignals {
            booking_status: self.booking_status.as_deref(),
            booking_end_at: self.booking_end_at,
            booking_invitee_time: self.booking_invitee_time.as_deref(),
            has_session_note,
        }
    }

    pub fn effective_status(&self, has_session_note: bool, now: DateTime<FixedOffset>) -> EffectiveStatus {
        derive_effective_status(&self.status_signals(has_session_note), now)
    }

    /// Start and end of the session, from the structured columns when both
    /// are present, otherwise from the invitee string.
    pub fn session_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.booking_start_at, self.booking_end_at) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => self
                .booking_invitee_time
                .as_deref()
                .and_then(parse_invitee_time)
                .map(|window| (window.start, window.end)),
        }
    }

    /// In session right now: inside its window and not cancelled or a no-show.
    pub fn is_live(&self, now: DateTime<FixedOffset>) -> bool {
        if self.raw_status().is_terminal() {
            return false;
        }
        let now = now.with_timezone(&Utc);
        matches!(self.session_window(), Some((start, end)) if start <= now && now <= end)
    }

    pub fn client_display_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or("A client")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithStatus {
    #[serde(flatten)]
    pub booking: Booking,
    pub effective_status: EffectiveStatus,
    pub has_session_note: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub scheduled: usize,
    pub completed: usize,
    pub pending_notes: usize,
    pub no_show: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: EffectiveStatus) {
        match status {
            EffectiveStatus::Scheduled => self.scheduled += 1,
            EffectiveStatus::Completed => self.completed += 1,
            EffectiveStatus::PendingNotes => self.pending_notes += 1,
            EffectiveStatus::NoShow => self.no_show += 1,
            EffectiveStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.scheduled + self.completed + self.pending_notes + self.no_show + self.cancelled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDashboard {
    pub bookings: Vec<BookingWithStatus>,
    pub counts: StatusCounts,
    pub as_of: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: Uuid,
    pub booking_id: String,
    pub therapist_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Booking as pushed by the scheduling integration. Timestamps arrive as
/// text and may or may not carry an offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub booking_id: String,
    pub booking_status: Option<String>,
    pub booking_start_at: Option<String>,
    pub booking_end_at: Option<String>,
    pub booking_invitee_time: Option<String>,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub therapist_id: Option<Uuid>,
    pub therapist_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub booking_status: Option<String>,
    pub refund_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionNoteRequest {
    pub booking_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListQuery {
    pub therapist_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<EffectiveStatus>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PaperformLinkQuery {
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSessionsCount {
    pub count: usize,
    pub as_of: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperformLink {
    pub booking_id: String,
    pub url: String,
}
