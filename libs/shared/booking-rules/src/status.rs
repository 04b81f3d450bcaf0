use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::invitee_time::parse_invitee_time;
use crate::raw_status::RawBookingStatus;

/// Derived lifecycle state of a booking. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Scheduled,
    Completed,
    PendingNotes,
    NoShow,
    Cancelled,
}

impl EffectiveStatus {
    pub const ALL: [EffectiveStatus; 5] = [
        EffectiveStatus::Scheduled,
        EffectiveStatus::Completed,
        EffectiveStatus::PendingNotes,
        EffectiveStatus::NoShow,
        EffectiveStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Scheduled => "scheduled",
            EffectiveStatus::Completed => "completed",
            EffectiveStatus::PendingNotes => "pending_notes",
            EffectiveStatus::NoShow => "no_show",
            EffectiveStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The denormalized signals a booking's status is inferred from.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSignals<'a> {
    pub booking_status: Option<&'a str>,
    pub booking_end_at: Option<DateTime<Utc>>,
    pub booking_invitee_time: Option<&'a str>,
    pub has_session_note: bool,
}

impl StatusSignals<'_> {
    /// Structured end time first; the invitee string only when the structured
    /// column is empty.
    pub fn session_end(&self) -> Option<DateTime<Utc>> {
        self.booking_end_at.or_else(|| {
            self.booking_invitee_time
                .and_then(parse_invitee_time)
                .map(|window| window.end)
        })
    }
}

/// Precedence: cancelled, no-show, note exists, past end, otherwise scheduled.
///
/// Cancelled and no-show win even when a note was attached afterwards. A
/// booking whose end time cannot be resolved stays `Scheduled`. `now` must be
/// the single IST instant taken for the whole request.
pub fn derive_effective_status(signals: &StatusSignals<'_>, now: DateTime<FixedOffset>) -> EffectiveStatus {
    let raw = RawBookingStatus::parse(signals.booking_status);

    if raw.is_cancelled() {
        return EffectiveStatus::Cancelled;
    }
    if raw.is_no_show() {
        return EffectiveStatus::NoShow;
    }
    if signals.has_session_note {
        return EffectiveStatus::Completed;
    }

    match signals.session_end() {
        Some(end) if now.with_timezone(&Utc) > end => EffectiveStatus::PendingNotes,
        _ => EffectiveStatus::Scheduled,
    }
}
