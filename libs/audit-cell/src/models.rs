use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Therapist actions that are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Copied client contact details.
    Copy,
    WhatsappSend,
    SosRaise,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Copy => "copy",
            AuditAction::WhatsappSend => "whatsapp_send",
            AuditAction::SosRaise => "sos_raise",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub action: AuditAction,
    pub client_id: Option<Uuid>,
    pub booking_id: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub therapist_id: Uuid,
    pub action: AuditAction,
    pub client_id: Option<Uuid>,
    pub booking_id: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAuditRequest {
    /// Admins recording on a therapist's behalf must name them.
    pub therapist_id: Option<Uuid>,
    pub action: AuditAction,
    pub client_id: Option<Uuid>,
    pub booking_id: Option<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub therapist_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}
