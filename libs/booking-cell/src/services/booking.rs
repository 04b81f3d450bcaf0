use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use booking_rules::clock::parse_practice_timestamp;
use booking_rules::{RawBookingStatus, RefundStatus};
use shared_database::PostgrestClient;

use crate::error::BookingError;
use crate::models::{
    Booking, BookingDashboard, BookingListQuery, BookingWithStatus, CreateBookingRequest,
    StatusCounts, UpdateBookingStatusRequest,
};

const DEFAULT_LIST_LIMIT: u32 = 200;
const MAX_LIST_LIMIT: u32 = 1000;

pub struct BookingService {
    db: Arc<PostgrestClient>,
}

impl BookingService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(booking_id = %request.booking_id))]
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        let booking_id = request.booking_id.trim().to_string();
        if booking_id.is_empty() {
            return Err(BookingError::ValidationError("booking_id is required".to_string()));
        }

        let start_at = parse_optional_timestamp("booking_start_at", request.booking_start_at.as_deref())?;
        let end_at = parse_optional_timestamp("booking_end_at", request.booking_end_at.as_deref())?;
        if let (Some(start), Some(end)) = (start_at, end_at) {
            if end <= start {
                return Err(BookingError::ValidationError(
                    "booking_end_at must be after booking_start_at".to_string(),
                ));
            }
        }

        if self.get_booking(&booking_id).await?.is_some() {
            return Err(BookingError::AlreadyExists(booking_id));
        }

        let status = RawBookingStatus::parse(request.booking_status.as_deref());
        let row = json!({
            "booking_id": booking_id,
            "booking_status": status.as_db_value(),
            "booking_start_at": start_at.map(|t| t.to_rfc3339()),
            "booking_end_at": end_at.map(|t| t.to_rfc3339()),
            "booking_invitee_time": request.booking_invitee_time,
            "client_id": request.client_id,
            "client_name": request.client_name,
            "therapist_id": request.therapist_id,
            "therapist_name": request.therapist_name,
        });

        let stored: Vec<Booking> = self.db.insert("bookings", row).await?;
        let booking = stored
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::DatabaseError("Insert returned no booking row".to_string()))?;

        info!("Booking {} stored", booking.booking_id);
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, BookingError> {
        let path = format!("/rest/v1/bookings?booking_id=eq.{}", urlencoding::encode(booking_id));
        Ok(self.db.select_one(&path).await?)
    }

    pub async fn require_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.get_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(booking_id.to_string()))
    }

    /// Writes new status columns and returns the row before and after.
    #[instrument(skip(self, request))]
    pub async fn update_status(
        &self,
        booking_id: &str,
        request: UpdateBookingStatusRequest,
    ) -> Result<(Booking, Booking), BookingError> {
        if request.booking_status.is_none() && request.refund_status.is_none() {
            return Err(BookingError::ValidationError(
                "booking_status or refund_status is required".to_string(),
            ));
        }

        let before = self.require_booking(booking_id).await?;

        let mut changes = Map::new();
        if let Some(status) = request.booking_status.as_deref() {
            changes.insert(
                "booking_status".to_string(),
                json!(RawBookingStatus::parse(Some(status)).as_db_value()),
            );
        }
        if let Some(refund) = request.refund_status.as_deref() {
            let normalized = match RefundStatus::parse(Some(refund)) {
                RefundStatus::Requested => Some("requested".to_string()),
                RefundStatus::Processed => Some("processed".to_string()),
                RefundStatus::Other(other) => Some(other),
                RefundStatus::Missing => None,
            };
            changes.insert("refund_status".to_string(), json!(normalized));
        }

        let path = format!("/rest/v1/bookings?booking_id=eq.{}", urlencoding::encode(booking_id));
        let updated: Vec<Booking> = self.db.update(&path, Value::Object(changes)).await?;
        let after = updated
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::NotFound(booking_id.to_string()))?;

        info!(
            "Booking {} status {:?} -> {:?}, refund {:?} -> {:?}",
            booking_id, before.booking_status, after.booking_status, before.refund_status, after.refund_status
        );
        Ok((before, after))
    }

    pub async fn list_bookings(&self, query: &BookingListQuery) -> Result<Vec<Booking>, BookingError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let mut path = format!("/rest/v1/bookings?order=booking_start_at.desc.nullslast&limit={}", limit);
        if let Some(therapist_id) = query.therapist_id {
            path.push_str(&format!("&therapist_id=eq.{}", therapist_id));
        }
        if let Some(client_id) = query.client_id {
            path.push_str(&format!("&client_id=eq.{}", client_id));
        }

        debug!("Listing bookings: {}", path);
        Ok(self.db.select(&path).await?)
    }

    /// Booking ids (from `booking_ids`) that already have a session note.
    /// One round trip regardless of how many bookings are on the page.
    pub async fn booking_ids_with_notes(&self, booking_ids: &[&str]) -> Result<HashSet<String>, BookingError> {
        if booking_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let quoted: Vec<String> = booking_ids
            .iter()
            .map(|id| format!("\"{}\"", id.replace('"', "")))
            .collect();
        let path = format!(
            "/rest/v1/session_notes?select=booking_id&booking_id=in.({})",
            urlencoding::encode(&quoted.join(","))
        );

        let rows: Vec<Value> = self.db.select(&path).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("booking_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Bookings with their derived status. `now` is taken once by the caller
    /// so every row on the page is judged against the same instant.
    #[instrument(skip(self, query))]
    pub async fn dashboard(
        &self,
        query: &BookingListQuery,
        now: DateTime<FixedOffset>,
    ) -> Result<BookingDashboard, BookingError> {
        let bookings = self.list_bookings(query).await?;
        let ids: Vec<&str> = bookings.iter().map(|b| b.booking_id.as_str()).collect();
        let noted = self.booking_ids_with_notes(&ids).await?;

        let mut counts = StatusCounts::default();
        let mut rows = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let has_session_note = noted.contains(&booking.booking_id);
            let effective_status = booking.effective_status(has_session_note, now);
            counts.record(effective_status);

            if query.status.map_or(true, |wanted| wanted == effective_status) {
                rows.push(BookingWithStatus {
                    booking,
                    effective_status,
                    has_session_note,
                });
            }
        }

        Ok(BookingDashboard {
            bookings: rows,
            counts,
            as_of: now,
        })
    }

    /// Sessions in progress at `now`.
    ///
    /// Rows missing either structured timestamp are fetched as well so that
    /// `Booking::is_live` can fall back to the invitee time string.
    #[instrument(skip(self))]
    pub async fn live_sessions_count(&self, now: DateTime<FixedOffset>) -> Result<usize, BookingError> {
        let path = format!("/rest/v1/bookings?or={}", urlencoding::encode(&live_window_filter(now)));

        let candidates: Vec<Booking> = self.db.select(&path).await?;
        let count = candidates.iter().filter(|booking| booking.is_live(now)).count();
        debug!("{} of {} candidate bookings are live", count, candidates.len());
        Ok(count)
    }
}

/// PostgREST `or` tree: the structured window contains `now`, or either
/// bound is missing.
///
/// IST wall clock with an explicit offset compares correctly against
/// timestamptz columns, and against naive columns (which hold IST wall clock)
/// because Postgres drops the offset when casting.
fn live_window_filter(now: DateTime<FixedOffset>) -> String {
    let instant = now.to_rfc3339_opts(SecondsFormat::Secs, false);
    format!(
        "(and(booking_start_at.lte.\"{0}\",booking_end_at.gte.\"{0}\"),booking_start_at.is.null,booking_end_at.is.null)",
        instant
    )
}

fn parse_optional_timestamp(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, BookingError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => parse_practice_timestamp(value)
            .map(Some)
            .ok_or_else(|| BookingError::ValidationError(format!("{} is not a valid timestamp: {}", field, value))),
    }
}
