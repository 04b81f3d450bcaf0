use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ==============================================================================
// ASSESSMENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SosStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl SosStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SosStatus::Open => "open",
            SosStatus::Acknowledged => "acknowledged",
            SosStatus::Resolved => "resolved",
        }
    }

    /// Assessments only move forward; an open one may be resolved directly.
    pub fn can_transition_to(&self, next: SosStatus) -> bool {
        matches!(
            (self, next),
            (SosStatus::Open, SosStatus::Acknowledged)
                | (SosStatus::Open, SosStatus::Resolved)
                | (SosStatus::Acknowledged, SosStatus::Resolved)
        )
    }
}

impl fmt::Display for SosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosAssessment {
    pub id: Uuid,
    pub booking_id: String,
    pub client_id: Uuid,
    pub therapist_id: Uuid,
    pub risk_level: RiskLevel,
    pub status: SosStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Bearer token granting time-bounded read access to one client's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosToken {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub client_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub access_count: i64,
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSosRequest {
    pub booking_id: String,
    pub risk_level: RiskLevel,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSosRequest {
    pub id: Uuid,
    pub status: Option<SosStatus>,
    pub risk_level: Option<RiskLevel>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SosListQuery {
    pub therapist_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<SosStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentationQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SosRaised {
    pub assessment: SosAssessment,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Everything a responder needs about the client, gathered by `client_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentationBundle {
    pub client_id: Uuid,
    pub assessment: SosAssessment,
    pub case_history: Vec<Value>,
    pub progress_notes: Vec<Value>,
    pub therapy_goals: Vec<Value>,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
}

/// Body posted to the n8n escalation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosWebhookPayload {
    pub assessment_id: Uuid,
    pub booking_id: String,
    pub client_id: Uuid,
    pub client_name: Option<String>,
    pub therapist_id: Uuid,
    pub therapist_name: Option<String>,
    pub risk_level: RiskLevel,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
