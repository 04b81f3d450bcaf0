// libs/sos-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::error::SosError;
use crate::models::{
    CreateSosRequest, DocumentationBundle, DocumentationQuery, SosAssessment, SosListQuery, SosRaised,
    UpdateSosRequest,
};
use crate::services::SosService;

const SOS_ROLES: &[&str] = &["therapist", "admin"];

pub async fn raise_sos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSosRequest>,
) -> Result<(StatusCode, Json<SosRaised>), AppError> {
    require_role(&user, SOS_ROLES)?;
    let acting = acting_therapist(&user)?;

    let raised = SosService::new(&state).raise(acting, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(raised)))
}

pub async fn list_sos_assessments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(mut query): Query<SosListQuery>,
) -> Result<Json<Vec<SosAssessment>>, AppError> {
    require_role(&user, SOS_ROLES)?;

    if let Some(own) = acting_therapist(&user)? {
        if query.therapist_id.is_some_and(|requested| requested != own) {
            return Err(SosError::Forbidden("Therapists can only view their own assessments".to_string()).into());
        }
        query.therapist_id = Some(own);
    }

    Ok(Json(SosService::new(&state).list(&query).await?))
}

pub async fn update_sos_assessment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateSosRequest>,
) -> Result<Json<SosAssessment>, AppError> {
    require_role(&user, SOS_ROLES)?;
    let acting = acting_therapist(&user)?;

    let updated = SosService::new(&state).update(acting, request, Utc::now()).await?;
    Ok(Json(updated))
}

/// Public: the SOS token in the query string is the credential.
pub async fn get_sos_documentation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DocumentationQuery>,
) -> Result<Json<DocumentationBundle>, AppError> {
    let token = query
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("token is required".to_string()))?;

    let bundle = SosService::new(&state).documentation(&token, Utc::now()).await?;
    Ok(Json(bundle))
}

/// `None` for admins, the caller's own id for therapists.
fn acting_therapist(user: &User) -> Result<Option<Uuid>, AppError> {
    if user.is_admin() {
        return Ok(None);
    }
    Uuid::parse_str(&user.id)
        .map(Some)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}
