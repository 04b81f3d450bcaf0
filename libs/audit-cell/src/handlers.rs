// libs/audit-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::error::AuditError;
use crate::models::{AuditAction, AuditEntry, AuditLogQuery, NewAuditEntry, RecordAuditRequest};
use crate::services::AuditService;

pub async fn record_audit_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<RecordAuditRequest>,
) -> Result<(StatusCode, Json<AuditEntry>), AppError> {
    require_role(&user, &["therapist", "admin"])?;

    // SOS raises are recorded by the SOS flow itself.
    if request.action == AuditAction::SosRaise {
        return Err(AuditError::ValidationError("sos_raise is recorded when an SOS assessment is created".to_string()).into());
    }

    let therapist_id = acting_therapist(&user, request.therapist_id)?;
    let service = AuditService::new(state.db.clone());
    let entry = service
        .record(NewAuditEntry {
            therapist_id,
            action: request.action,
            client_id: request.client_id,
            booking_id: request.booking_id,
            details: request.details,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_audit_entries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(mut query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require_role(&user, &["therapist", "admin"])?;

    if !user.is_admin() {
        query.therapist_id = Some(acting_therapist(&user, query.therapist_id)?);
    }

    let service = AuditService::new(state.db.clone());
    Ok(Json(service.list(&query).await?))
}

fn acting_therapist(user: &User, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    if user.is_admin() {
        return requested.ok_or_else(|| AppError::BadRequest("therapist_id is required".to_string()));
    }

    let own = Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;
    match requested {
        Some(other) if other != own => {
            Err(AuditError::Forbidden("Therapists can only access their own audit entries".to_string()).into())
        }
        _ => Ok(own),
    }
}
