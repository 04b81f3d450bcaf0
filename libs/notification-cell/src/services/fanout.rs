use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use booking_cell::{BookingEvent, BookingEventHook};
use shared_database::PostgrestClient;

use crate::models::{AdminUser, Notification, NotificationEvent, TherapistContact};
use crate::planner::plan_notifications;

/// Persists the notifications a booking event calls for.
pub struct NotificationFanout {
    db: Arc<PostgrestClient>,
}

impl NotificationFanout {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    async fn admin_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        let admins: Vec<AdminUser> = self
            .db
            .select("/rest/v1/users?select=id&role=eq.admin")
            .await
            .context("Failed to load admin users")?;
        Ok(admins.into_iter().map(|admin| admin.id).collect())
    }

    async fn therapist(&self, therapist_id: Option<Uuid>) -> anyhow::Result<Option<TherapistContact>> {
        let Some(therapist_id) = therapist_id else {
            return Ok(None);
        };
        let path = format!("/rest/v1/therapists?therapist_id=eq.{}", therapist_id);
        let contact: Option<TherapistContact> = self
            .db
            .select_one(&path)
            .await
            .context("Failed to resolve therapist")?;

        if contact.is_none() {
            warn!("Booking references unknown therapist {}", therapist_id);
        }
        Ok(contact)
    }
}

#[async_trait]
impl BookingEventHook for NotificationFanout {
    #[instrument(skip(self, event), fields(booking_id = %event.booking().booking_id))]
    async fn on_booking_event(&self, event: &BookingEvent) -> anyhow::Result<()> {
        let Some(kind) = NotificationEvent::from_booking_event(event) else {
            debug!("Booking event does not produce notifications");
            return Ok(());
        };

        let admins = self.admin_ids().await?;
        let therapist = if kind.notifies_therapist() {
            self.therapist(event.booking().therapist_id).await?
        } else {
            None
        };

        let rows = plan_notifications(event, &admins, therapist.as_ref());
        if rows.is_empty() {
            warn!("No recipients for {:?}", kind);
            return Ok(());
        }

        let body = serde_json::to_value(&rows)?;
        let created: Vec<Notification> = self
            .db
            .insert("notifications", body)
            .await
            .context("Failed to insert notifications")?;

        info!("Created {} notifications for {:?}", created.len(), kind);
        Ok(())
    }
}
