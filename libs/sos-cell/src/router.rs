// libs/sos-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn sos_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/sos-documentation", get(handlers::get_sos_documentation));

    let protected_routes = Router::new()
        .route(
            "/sos-assessments",
            get(handlers::list_sos_assessments)
                .post(handlers::raise_sos)
                .put(handlers::update_sos_assessment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
