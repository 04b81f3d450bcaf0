use chrono::{DateTime, Duration, Utc};

use booking_cell::Booking;

use crate::error::SosError;

/// SOS may be raised while the session runs or within `window_hours` after
/// it ends.
pub fn check_eligibility(booking: &Booking, now: DateTime<Utc>, window_hours: i64) -> Result<(), SosError> {
    if booking.raw_status().is_terminal() {
        return Err(SosError::NotEligible("booking was cancelled or missed".to_string()));
    }

    let (start, end) = booking
        .session_window()
        .ok_or_else(|| SosError::NotEligible("session time is unknown".to_string()))?;

    if now < start {
        return Err(SosError::NotEligible("session has not started".to_string()));
    }
    if now <= end {
        return Ok(());
    }

    if now - end > Duration::hours(window_hours) {
        return Err(SosError::NotEligible(format!(
            "more than {} hours have passed since the session ended",
            window_hours
        )));
    }
    Ok(())
}
