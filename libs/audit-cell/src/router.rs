// libs/audit-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// No update or delete routes: the log is append-only.
pub fn audit_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/audit-logs", post(handlers::record_audit_entry).get(handlers::list_audit_entries))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
