use std::sync::Arc;

use tracing::{debug, info};

use shared_database::PostgrestClient;

use crate::error::AuditError;
use crate::models::{AuditEntry, AuditLogQuery, NewAuditEntry};

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 500;

/// Append-only access to `audit_logs`.
pub struct AuditService {
    db: Arc<PostgrestClient>,
}

impl AuditService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuditError> {
        let body = serde_json::to_value(&entry).map_err(|e| AuditError::ValidationError(e.to_string()))?;
        let stored: Vec<AuditEntry> = self.db.insert("audit_logs", body).await?;
        let stored = stored
            .into_iter()
            .next()
            .ok_or_else(|| AuditError::DatabaseError("Insert returned no audit row".to_string()))?;

        info!(
            target: "audit",
            audit_id = %stored.id,
            therapist_id = %stored.therapist_id,
            action = %stored.action,
            client_id = ?stored.client_id,
            booking_id = ?stored.booking_id,
            "Therapist action recorded"
        );
        Ok(stored)
    }

    pub async fn list(&self, query: &AuditLogQuery) -> Result<Vec<AuditEntry>, AuditError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let mut path = format!("/rest/v1/audit_logs?order=created_at.desc&limit={}", limit);
        if let Some(therapist_id) = query.therapist_id {
            path.push_str(&format!("&therapist_id=eq.{}", therapist_id));
        }
        if let Some(action) = query.action {
            path.push_str(&format!("&action=eq.{}", action));
        }

        debug!("Fetching audit log: {}", path);
        Ok(self.db.select(&path).await?)
    }
}
