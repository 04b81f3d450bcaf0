use uuid::Uuid;

use booking_cell::{Booking, BookingEvent};

use crate::models::{NewNotification, NotificationEvent, NotificationRole, TherapistContact};

/// Rows to create for `event`: one per admin, plus one for the assigned
/// therapist when the event concerns their schedule and the therapist
/// resolved. Events that qualify for nothing yield an empty list.
pub fn plan_notifications(
    event: &BookingEvent,
    admins: &[Uuid],
    therapist: Option<&TherapistContact>,
) -> Vec<NewNotification> {
    let Some(kind) = NotificationEvent::from_booking_event(event) else {
        return Vec::new();
    };
    let booking = event.booking();
    let message = describe(kind, booking);

    let mut rows: Vec<NewNotification> = admins
        .iter()
        .map(|admin_id| NewNotification {
            user_id: *admin_id,
            user_role: NotificationRole::Admin,
            event_type: kind,
            title: kind.title().to_string(),
            message: message.clone(),
            booking_id: Some(booking.booking_id.clone()),
        })
        .collect();

    if kind.notifies_therapist() {
        // Only the therapist the booking names; a stale contact row for a
        // different therapist is ignored.
        if let Some(contact) = therapist.filter(|t| booking.therapist_id == Some(t.therapist_id)) {
            rows.push(NewNotification {
                user_id: contact.therapist_id,
                user_role: NotificationRole::Therapist,
                event_type: kind,
                title: kind.title().to_string(),
                message,
                booking_id: Some(booking.booking_id.clone()),
            });
        }
    }

    rows
}

fn describe(kind: NotificationEvent, booking: &Booking) -> String {
    let client = booking.client_display_name();
    let with = booking
        .therapist_name
        .as_deref()
        .map(|name| format!(" with {}", name))
        .unwrap_or_default();

    match kind {
        NotificationEvent::BookingCreated => format!("{} booked a session{}", client, with),
        NotificationEvent::BookingCancelled => format!("{} cancelled their session{}", client, with),
        NotificationEvent::BookingRescheduled => format!("{} rescheduled their session{}", client, with),
        NotificationEvent::BookingNoShow => format!("{} did not attend their session{}", client, with),
        NotificationEvent::RefundRequested => format!("{} requested a refund for booking {}", client, booking.booking_id),
        NotificationEvent::RefundProcessed => format!("Refund processed for {} (booking {})", client, booking.booking_id),
    }
}
