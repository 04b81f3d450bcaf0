use booking_rules::to_ist;

use crate::error::BookingError;
use crate::models::Booking;

/// Session-note form link prefilled with the booking's identity fields.
pub fn paperform_link(base_url: &str, booking: &Booking) -> Result<String, BookingError> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(BookingError::PaperformNotConfigured);
    }

    let mut params: Vec<(&str, String)> = vec![("booking_id", booking.booking_id.clone())];
    if let Some(client_id) = booking.client_id {
        params.push(("client_id", client_id.to_string()));
    }
    if let Some(name) = booking.client_name.as_deref() {
        params.push(("client_name", name.to_string()));
    }
    if let Some(therapist_id) = booking.therapist_id {
        params.push(("therapist_id", therapist_id.to_string()));
    }
    if let Some(name) = booking.therapist_name.as_deref() {
        params.push(("therapist_name", name.to_string()));
    }
    if let Some((start, _)) = booking.session_window() {
        params.push(("session_date", to_ist(start).format("%Y-%m-%d").to_string()));
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if base_url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", base_url, separator, query))
}
