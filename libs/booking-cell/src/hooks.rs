use async_trait::async_trait;

use booking_rules::{RawBookingStatus, RefundStatus};

use crate::models::Booking;

/// A mutation of a booking row that other cells may react to.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    Created(Booking),
    StatusChanged {
        booking: Booking,
        from: RawBookingStatus,
        to: RawBookingStatus,
    },
    RefundStatusChanged {
        booking: Booking,
        from: RefundStatus,
        to: RefundStatus,
    },
}

impl BookingEvent {
    pub fn booking(&self) -> &Booking {
        match self {
            BookingEvent::Created(booking)
            | BookingEvent::StatusChanged { booking, .. }
            | BookingEvent::RefundStatusChanged { booking, .. } => booking,
        }
    }

    /// Events implied by an update. Spelling-only changes (`canceled` to
    /// `cancelled`) are not transitions.
    pub fn from_update(before: &Booking, after: &Booking) -> Vec<BookingEvent> {
        let mut events = Vec::new();

        let (from, to) = (before.raw_status(), after.raw_status());
        if from != to {
            events.push(BookingEvent::StatusChanged {
                booking: after.clone(),
                from,
                to,
            });
        }

        let (from, to) = (before.refund(), after.refund());
        if from != to {
            events.push(BookingEvent::RefundStatusChanged {
                booking: after.clone(),
                from,
                to,
            });
        }

        events
    }
}

/// Called after a booking write has been persisted.
///
/// Implementations must not assume the event qualifies for any action;
/// unknown transitions are expected and ignored.
#[async_trait]
pub trait BookingEventHook: Send + Sync {
    async fn on_booking_event(&self, event: &BookingEvent) -> anyhow::Result<()>;
}
