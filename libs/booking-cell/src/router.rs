// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::hooks::BookingEventHook;

#[derive(Clone)]
pub struct BookingState {
    pub app: Arc<AppState>,
    pub hook: Arc<dyn BookingEventHook>,
}

pub fn booking_routes(app: Arc<AppState>, hook: Arc<dyn BookingEventHook>) -> Router {
    let state = BookingState { app: app.clone(), hook };

    Router::new()
        .route("/bookings", post(handlers::create_booking).get(handlers::list_bookings))
        .route("/bookings/{booking_id}/status", put(handlers::update_booking_status))
        .route("/live-sessions-count", get(handlers::live_sessions_count))
        .route("/paperform-link", get(handlers::get_paperform_link))
        .route("/session-notes", post(handlers::create_session_note))
        .layer(middleware::from_fn_with_state(app, auth_middleware))
        .with_state(state)
}
