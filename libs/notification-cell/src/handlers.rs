// libs/notification-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::error::NotificationError;
use crate::models::{DeleteNotificationQuery, MarkReadRequest, NotificationList, NotificationQuery, NotificationRole};
use crate::services::NotificationService;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<NotificationList>, AppError> {
    let (user_id, role) = resolve_recipient(&user, query.user_id, query.user_role)?;

    let service = NotificationService::new(state.db.clone());
    let list = service.list(user_id, role, query.limit).await?;

    Ok(Json(list))
}

pub async fn mark_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<MarkReadRequest>,
) -> Result<Json<Value>, AppError> {
    let (user_id, role) = resolve_recipient(&user, request.user_id, request.user_role)?;

    let service = NotificationService::new(state.db.clone());
    let updated = service.mark_read(user_id, role, request.notification_id).await?;

    Ok(Json(json!({ "success": true, "updated": updated })))
}

pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<DeleteNotificationQuery>,
) -> Result<Json<Value>, AppError> {
    let (user_id, role) = resolve_recipient(&user, query.user_id, query.user_role)?;

    let service = NotificationService::new(state.db.clone());
    service.delete(user_id, role, query.notification_id).await?;

    Ok(Json(json!({ "success": true })))
}

/// Whose notifications the request addresses. Callers default to themselves;
/// only admins may address another user's inbox.
fn resolve_recipient(
    user: &User,
    user_id: Option<Uuid>,
    user_role: Option<NotificationRole>,
) -> Result<(Uuid, NotificationRole), AppError> {
    let caller_role = user
        .role
        .as_deref()
        .and_then(NotificationRole::from_user_role)
        .ok_or_else(|| NotificationError::Forbidden("Only admins and therapists receive notifications".to_string()))?;
    let caller_id = Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

    let target_id = user_id.unwrap_or(caller_id);
    let target_role = user_role.unwrap_or(caller_role);

    if caller_role != NotificationRole::Admin && (target_id != caller_id || target_role != caller_role) {
        return Err(NotificationError::Forbidden("Cannot access another user's notifications".to_string()).into());
    }

    Ok((target_id, target_role))
}
