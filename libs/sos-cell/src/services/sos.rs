use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use audit_cell::{AuditAction, AuditService, NewAuditEntry};
use booking_cell::services::BookingService;
use shared_database::{AppState, PostgrestClient};

use crate::eligibility::check_eligibility;
use crate::error::SosError;
use crate::models::{
    CreateSosRequest, DocumentationBundle, SosAssessment, SosListQuery, SosRaised, SosStatus,
    SosToken, SosWebhookPayload, UpdateSosRequest,
};
use crate::services::webhook::SosWebhook;
use crate::token::{generate_token, validate_access};

pub struct SosService {
    db: Arc<PostgrestClient>,
    audit: AuditService,
    webhook: SosWebhook,
    eligibility_window_hours: i64,
    token_ttl_hours: i64,
}

impl SosService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            audit: AuditService::new(state.db.clone()),
            webhook: SosWebhook::new(state.http.clone(), &state.config),
            eligibility_window_hours: state.config.sos_eligibility_window_hours,
            token_ttl_hours: state.config.sos_token_ttl_hours,
        }
    }

    /// Opens an assessment, issues its documentation token, records the
    /// `sos_raise` audit entry and then notifies n8n.
    ///
    /// `acting_therapist` is `None` for admins, who may raise SOS for any
    /// booking; therapists only for bookings assigned to them.
    #[instrument(skip(self, request), fields(booking_id = %request.booking_id))]
    pub async fn raise(
        &self,
        acting_therapist: Option<Uuid>,
        request: CreateSosRequest,
        now: DateTime<Utc>,
    ) -> Result<SosRaised, SosError> {
        let booking = BookingService::new(self.db.clone())
            .require_booking(&request.booking_id)
            .await?;

        let therapist_id = booking
            .therapist_id
            .ok_or_else(|| SosError::ValidationError("booking has no assigned therapist".to_string()))?;
        if acting_therapist.is_some_and(|caller| caller != therapist_id) {
            return Err(SosError::Forbidden("booking is not assigned to this therapist".to_string()));
        }
        let client_id = booking
            .client_id
            .ok_or_else(|| SosError::ValidationError("booking has no client_id".to_string()))?;

        check_eligibility(&booking, now, self.eligibility_window_hours)?;

        let assessment: SosAssessment = self
            .insert_one(
                "sos_assessments",
                json!({
                    "booking_id": booking.booking_id,
                    "client_id": client_id,
                    "therapist_id": therapist_id,
                    "risk_level": request.risk_level,
                    "status": SosStatus::Open,
                    "notes": request.notes,
                }),
            )
            .await?;

        let expires_at = now + Duration::hours(self.token_ttl_hours);
        let token: SosToken = self
            .insert_one(
                "sos_tokens",
                json!({
                    "assessment_id": assessment.id,
                    "client_id": client_id,
                    "token": generate_token(),
                    "expires_at": expires_at,
                    "is_active": true,
                    "access_count": 0,
                }),
            )
            .await?;

        info!("SOS assessment {} raised for client {}", assessment.id, client_id);

        let audit = NewAuditEntry {
            therapist_id,
            action: AuditAction::SosRaise,
            client_id: Some(client_id),
            booking_id: Some(booking.booking_id.clone()),
            details: Some(json!({
                "assessment_id": assessment.id,
                "risk_level": assessment.risk_level,
            })),
        };
        if let Err(e) = self.audit.record(audit).await {
            error!("Failed to record sos_raise audit entry for {}: {}", assessment.id, e);
        }

        self.webhook
            .notify(&SosWebhookPayload {
                assessment_id: assessment.id,
                booking_id: booking.booking_id.clone(),
                client_id,
                client_name: booking.client_name.clone(),
                therapist_id,
                therapist_name: booking.therapist_name.clone(),
                risk_level: assessment.risk_level,
                token: token.token.clone(),
                expires_at: token.expires_at,
            })
            .await;

        Ok(SosRaised {
            assessment,
            token: token.token,
            expires_at: token.expires_at,
        })
    }

    pub async fn list(&self, query: &SosListQuery) -> Result<Vec<SosAssessment>, SosError> {
        let mut path = "/rest/v1/sos_assessments?order=created_at.desc".to_string();
        if let Some(therapist_id) = query.therapist_id {
            path.push_str(&format!("&therapist_id=eq.{}", therapist_id));
        }
        if let Some(client_id) = query.client_id {
            path.push_str(&format!("&client_id=eq.{}", client_id));
        }
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        debug!("Listing SOS assessments: {}", path);
        Ok(self.db.select(&path).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<SosAssessment, SosError> {
        self.db
            .select_one(&format!("/rest/v1/sos_assessments?id=eq.{}", id))
            .await?
            .ok_or_else(|| SosError::AssessmentNotFound(id.to_string()))
    }

    /// Applies a status / risk / notes change. Resolving revokes every
    /// documentation token issued for the assessment. Resolving an assessment
    /// that is already resolved re-runs the revocation, so a failed revoke can
    /// be retried.
    #[instrument(skip(self, request), fields(assessment_id = %request.id))]
    pub async fn update(
        &self,
        acting_therapist: Option<Uuid>,
        request: UpdateSosRequest,
        now: DateTime<Utc>,
    ) -> Result<SosAssessment, SosError> {
        let current = self.get(request.id).await?;
        if acting_therapist.is_some_and(|caller| caller != current.therapist_id) {
            return Err(SosError::Forbidden("assessment belongs to another therapist".to_string()));
        }

        let re_resolve = current.status == SosStatus::Resolved && request.status == Some(SosStatus::Resolved);

        let mut changes = Map::new();
        if let Some(next) = request.status.filter(|_| !re_resolve) {
            if !current.status.can_transition_to(next) {
                return Err(SosError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
            changes.insert("status".to_string(), json!(next));
            match next {
                SosStatus::Acknowledged => {
                    changes.insert("acknowledged_at".to_string(), json!(now));
                }
                SosStatus::Resolved => {
                    changes.insert("resolved_at".to_string(), json!(now));
                }
                SosStatus::Open => {}
            }
        }
        if let Some(risk_level) = request.risk_level {
            changes.insert("risk_level".to_string(), json!(risk_level));
        }
        if let Some(notes) = request.notes {
            changes.insert("notes".to_string(), json!(notes));
        }
        if changes.is_empty() && !re_resolve {
            return Err(SosError::ValidationError("nothing to update".to_string()));
        }

        let updated = if changes.is_empty() {
            current
        } else {
            let path = format!("/rest/v1/sos_assessments?id=eq.{}", current.id);
            let rows: Vec<SosAssessment> = self.db.update(&path, Value::Object(changes)).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| SosError::AssessmentNotFound(current.id.to_string()))?
        };

        if updated.status == SosStatus::Resolved {
            self.revoke_tokens(updated.id).await?;
            info!("SOS assessment {} resolved; tokens revoked", updated.id);
        }

        Ok(updated)
    }

    async fn revoke_tokens(&self, assessment_id: Uuid) -> Result<(), SosError> {
        self.db
            .execute(
                reqwest::Method::PATCH,
                &format!("/rest/v1/sos_tokens?assessment_id=eq.{}&is_active=eq.true", assessment_id),
                Some(json!({ "is_active": false })),
            )
            .await?;
        Ok(())
    }

    /// Validates `token`, counts the access and returns the client's
    /// documentation. The count update and the preceding read are separate
    /// statements; concurrent reads may record the same count.
    #[instrument(skip(self, token))]
    pub async fn documentation(&self, token: &str, now: DateTime<Utc>) -> Result<DocumentationBundle, SosError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SosError::TokenNotFound);
        }

        let path = format!("/rest/v1/sos_tokens?token=eq.{}", urlencoding::encode(token));
        let record: SosToken = self.db.select_one(&path).await?.ok_or(SosError::TokenNotFound)?;
        validate_access(&record, now)?;

        // Tokens of a resolved assessment are dead even if revocation never ran.
        let assessment = self.get(record.assessment_id).await?;
        if assessment.status == SosStatus::Resolved {
            return Err(SosError::TokenRevoked);
        }

        let access_count = record.access_count + 1;
        let accessed_at = record.accessed_at.unwrap_or(now);
        self.db
            .execute(
                reqwest::Method::PATCH,
                &format!("/rest/v1/sos_tokens?id=eq.{}", record.id),
                Some(json!({ "access_count": access_count, "accessed_at": accessed_at })),
            )
            .await?;

        let client = record.client_id;
        let case_history = self.client_records("case_history", client).await?;
        let progress_notes = self.client_records("progress_notes", client).await?;
        let therapy_goals = self.client_records("therapy_goals", client).await?;

        info!("SOS documentation for client {} accessed ({} total)", client, access_count);
        Ok(DocumentationBundle {
            client_id: client,
            assessment,
            case_history,
            progress_notes,
            therapy_goals,
            expires_at: record.expires_at,
            access_count,
        })
    }

    async fn client_records(&self, table: &str, client_id: Uuid) -> Result<Vec<Value>, SosError> {
        let path = format!("/rest/v1/{}?client_id=eq.{}&order=created_at.desc", table, client_id);
        Ok(self.db.select(&path).await?)
    }

    async fn insert_one<T>(&self, table: &str, row: Value) -> Result<T, SosError>
    where
        T: serde::de::DeserializeOwned,
    {
        let stored: Vec<T> = self.db.insert(table, row).await?;
        stored
            .into_iter()
            .next()
            .ok_or_else(|| SosError::DatabaseError(format!("Insert into {} returned no row", table)))
    }
}
