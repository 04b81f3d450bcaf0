use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use booking_cell::BookingEvent;
use booking_rules::{RawBookingStatus, RefundStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationRole {
    Admin,
    Therapist,
}

impl NotificationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationRole::Admin => "admin",
            NotificationRole::Therapist => "therapist",
        }
    }

    pub fn from_user_role(role: &str) -> Option<Self> {
        match role {
            "admin" => Some(NotificationRole::Admin),
            "therapist" => Some(NotificationRole::Therapist),
            _ => None,
        }
    }
}

/// Booking events that produce notifications. Every other booking event maps
/// to `None` and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    BookingCreated,
    BookingCancelled,
    BookingRescheduled,
    BookingNoShow,
    RefundRequested,
    RefundProcessed,
}

impl NotificationEvent {
    pub fn from_booking_event(event: &BookingEvent) -> Option<Self> {
        match event {
            BookingEvent::Created(_) => Some(NotificationEvent::BookingCreated),
            BookingEvent::StatusChanged { to, .. } => match to {
                RawBookingStatus::Cancelled => Some(NotificationEvent::BookingCancelled),
                RawBookingStatus::Rescheduled => Some(NotificationEvent::BookingRescheduled),
                RawBookingStatus::NoShow => Some(NotificationEvent::BookingNoShow),
                RawBookingStatus::Confirmed | RawBookingStatus::Other(_) | RawBookingStatus::Missing => None,
            },
            BookingEvent::RefundStatusChanged { to, .. } => match to {
                RefundStatus::Requested => Some(NotificationEvent::RefundRequested),
                RefundStatus::Processed => Some(NotificationEvent::RefundProcessed),
                RefundStatus::Other(_) | RefundStatus::Missing => None,
            },
        }
    }

    /// Admins hear about every event; the assigned therapist only about
    /// changes to their schedule.
    pub fn notifies_therapist(&self) -> bool {
        matches!(
            self,
            NotificationEvent::BookingCreated
                | NotificationEvent::BookingCancelled
                | NotificationEvent::BookingRescheduled
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationEvent::BookingCreated => "New booking",
            NotificationEvent::BookingCancelled => "Booking cancelled",
            NotificationEvent::BookingRescheduled => "Booking rescheduled",
            NotificationEvent::BookingNoShow => "Client no-show",
            NotificationEvent::RefundRequested => "Refund requested",
            NotificationEvent::RefundProcessed => "Refund processed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_role: NotificationRole,
    pub event_type: NotificationEvent,
    pub title: String,
    pub message: String,
    pub booking_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Row to insert; ids and timestamps come from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub user_role: NotificationRole,
    pub event_type: NotificationEvent,
    pub title: String,
    pub message: String,
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistContact {
    pub therapist_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<Uuid>,
    pub user_role: Option<NotificationRole>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkReadRequest {
    pub user_id: Option<Uuid>,
    pub user_role: Option<NotificationRole>,
    /// Marks every unread notification for the user when absent.
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNotificationQuery {
    pub user_id: Option<Uuid>,
    pub user_role: Option<NotificationRole>,
    pub notification_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}
