// libs/booking-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, warn};
use uuid::Uuid;

use booking_rules::now_ist;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::error::BookingError;
use crate::hooks::{BookingEvent, BookingEventHook};
use crate::models::{
    Booking, BookingDashboard, BookingListQuery, CreateBookingRequest, CreateSessionNoteRequest,
    LiveSessionsCount, PaperformLink, PaperformLinkQuery, SessionNote, UpdateBookingStatusRequest,
};
use crate::router::BookingState;
use crate::services::{paperform_link, BookingService, SessionNoteService};

const WRITER_ROLES: &[&str] = &["admin", "integration"];
const STAFF_ROLES: &[&str] = &["admin", "therapist"];

// ==============================================================================
// BOOKING INGEST
// ==============================================================================

pub async fn create_booking(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    require_role(&user, WRITER_ROLES)?;

    let service = BookingService::new(state.app.db.clone());
    let booking = service.create_booking(request).await?;

    dispatch(state.hook.as_ref(), vec![BookingEvent::Created(booking.clone())]).await;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn update_booking_status(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<String>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    require_role(&user, WRITER_ROLES)?;

    let service = BookingService::new(state.app.db.clone());
    let (before, after) = service.update_status(&booking_id, request).await?;

    dispatch(state.hook.as_ref(), BookingEvent::from_update(&before, &after)).await;

    Ok(Json(after))
}

/// The booking write has already committed; a failing hook is reported and
/// the request still succeeds.
async fn dispatch(hook: &dyn BookingEventHook, events: Vec<BookingEvent>) {
    for event in &events {
        if let Err(e) = hook.on_booking_event(event).await {
            warn!(
                "Booking event hook failed for booking {}: {:#}",
                event.booking().booking_id,
                e
            );
        }
    }
}

// ==============================================================================
// DASHBOARD READS
// ==============================================================================

pub async fn list_bookings(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingDashboard>, AppError> {
    let query = scope_to_caller(&user, query)?;
    let now = now_ist();

    let service = BookingService::new(state.app.db.clone());
    let dashboard = service.dashboard(&query, now).await?;

    debug!(
        "Dashboard for {}: {} bookings, {} shown",
        user.id,
        dashboard.counts.total(),
        dashboard.bookings.len()
    );
    Ok(Json(dashboard))
}

pub async fn live_sessions_count(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
) -> Result<Json<LiveSessionsCount>, AppError> {
    require_role(&user, STAFF_ROLES)?;
    let now = now_ist();

    let service = BookingService::new(state.app.db.clone());
    let count = service.live_sessions_count(now).await?;

    Ok(Json(LiveSessionsCount { count, as_of: now }))
}

pub async fn get_paperform_link(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
    Query(query): Query<PaperformLinkQuery>,
) -> Result<Json<PaperformLink>, AppError> {
    require_role(&user, STAFF_ROLES)?;

    let booking_id = query
        .booking_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("booking_id is required".to_string()))?;

    let service = BookingService::new(state.app.db.clone());
    let booking = service.require_booking(&booking_id).await?;
    ensure_assigned_therapist(&user, &booking)?;

    let url = paperform_link(&state.app.config.paperform_base_url, &booking)?;
    Ok(Json(PaperformLink { booking_id, url }))
}

// ==============================================================================
// SESSION NOTES
// ==============================================================================

pub async fn create_session_note(
    State(state): State<BookingState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSessionNoteRequest>,
) -> Result<(StatusCode, Json<SessionNote>), AppError> {
    require_role(&user, STAFF_ROLES)?;

    let bookings = BookingService::new(state.app.db.clone());
    let booking = bookings.require_booking(&request.booking_id).await?;
    ensure_assigned_therapist(&user, &booking)?;

    let notes = SessionNoteService::new(state.app.db.clone());
    let note = notes.create_note(&booking, &request.content).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

// ==============================================================================
// ACCESS SCOPING
// ==============================================================================

/// Therapists and clients only ever see their own bookings; admins see all.
fn scope_to_caller(user: &User, mut query: BookingListQuery) -> Result<BookingListQuery, AppError> {
    if user.is_admin() {
        return Ok(query);
    }

    if user.has_role("therapist") {
        let own = caller_uuid(user)?;
        if query.therapist_id.is_some_and(|requested| requested != own) {
            return Err(BookingError::Forbidden("Therapists can only view their own bookings".to_string()).into());
        }
        query.therapist_id = Some(own);
        return Ok(query);
    }

    if user.has_role("client") {
        let own = caller_uuid(user)?;
        if query.client_id.is_some_and(|requested| requested != own) {
            return Err(BookingError::Forbidden("Clients can only view their own bookings".to_string()).into());
        }
        query.client_id = Some(own);
        return Ok(query);
    }

    Err(AppError::Forbidden("Not permitted to view bookings".to_string()))
}

fn ensure_assigned_therapist(user: &User, booking: &Booking) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    let own = caller_uuid(user)?;
    if booking.therapist_id == Some(own) {
        Ok(())
    } else {
        Err(BookingError::Forbidden(format!(
            "Booking {} is not assigned to this therapist",
            booking.booking_id
        ))
        .into())
    }
}

fn caller_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}
