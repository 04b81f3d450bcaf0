use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use shared_database::PostgrestClient;

use crate::error::NotificationError;
use crate::models::{Notification, NotificationList, NotificationRole};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

pub struct NotificationService {
    db: Arc<PostgrestClient>,
}

impl NotificationService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    fn owner_filter(user_id: Uuid, role: NotificationRole) -> String {
        format!("user_id=eq.{}&user_role=eq.{}", user_id, role.as_str())
    }

    /// Newest first, with the total unread count for the user.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        role: NotificationRole,
        limit: Option<u32>,
    ) -> Result<NotificationList, NotificationError> {
        let owner = Self::owner_filter(user_id, role);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let path = format!("/rest/v1/notifications?{}&order=created_at.desc&limit={}", owner, limit);
        debug!("Fetching notifications: {}", path);
        let notifications: Vec<Notification> = self.db.select(&path).await?;

        let unread: Vec<Value> = self
            .db
            .select(&format!("/rest/v1/notifications?select=id&{}&is_read=eq.false", owner))
            .await?;

        Ok(NotificationList {
            notifications,
            unread_count: unread.len(),
        })
    }

    /// Marks one notification read, or every unread one when `notification_id`
    /// is `None`. Returns how many rows changed.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        role: NotificationRole,
        notification_id: Option<Uuid>,
    ) -> Result<usize, NotificationError> {
        let owner = Self::owner_filter(user_id, role);
        let path = match notification_id {
            Some(id) => format!("/rest/v1/notifications?id=eq.{}&{}", id, owner),
            None => format!("/rest/v1/notifications?{}&is_read=eq.false", owner),
        };

        let updated: Vec<Notification> = self.db.update(&path, json!({ "is_read": true })).await?;
        if let (Some(id), true) = (notification_id, updated.is_empty()) {
            return Err(NotificationError::NotFound(id.to_string()));
        }

        info!("Marked {} notifications read for {}", updated.len(), user_id);
        Ok(updated.len())
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        user_id: Uuid,
        role: NotificationRole,
        notification_id: Uuid,
    ) -> Result<(), NotificationError> {
        let path = format!(
            "/rest/v1/notifications?id=eq.{}&{}",
            notification_id,
            Self::owner_filter(user_id, role)
        );

        let deleted: Vec<Notification> = self.db.delete(&path).await?;

        if deleted.is_empty() {
            return Err(NotificationError::NotFound(notification_id.to_string()));
        }

        info!("Deleted notification {} for {}", notification_id, user_id);
        Ok(())
    }
}
