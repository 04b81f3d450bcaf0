use std::sync::Arc;

use axum::{routing::get, Router};

use audit_cell::audit_routes;
use booking_cell::{booking_routes, BookingEventHook};
use notification_cell::NotificationFanout;
use shared_database::AppState;
use sos_cell::sos_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    let fanout: Arc<dyn BookingEventHook> = Arc::new(NotificationFanout::new(state.db.clone()));

    let api = Router::new()
        .merge(booking_routes(state.clone(), fanout))
        .merge(notification_cell::notification_routes(state.clone()))
        .merge(sos_routes(state.clone()))
        .merge(audit_routes(state));

    Router::new()
        .route("/", get(|| async { "Teletherapy API is running!" }))
        .nest("/api", api)
}
