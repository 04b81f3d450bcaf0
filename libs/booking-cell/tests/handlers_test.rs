// libs/booking-cell/tests/handlers_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mockall::mock;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::{booking_routes, BookingEvent, BookingEventHook};
use booking_rules::RawBookingStatus;
use shared_utils::test_utils::{MockDbResponses, TestConfig, TestUser};

mock! {
    pub Hook {}

    #[async_trait]
    impl BookingEventHook for Hook {
        async fn on_booking_event(&self, event: &BookingEvent) -> anyhow::Result<()>;
    }
}

fn app(mock_server: &MockServer, hook: MockHook) -> Router {
    let state = TestConfig::with_database(&mock_server.uri()).to_state();
    booking_routes(state, Arc::new(hook))
}

fn idle_hook() -> MockHook {
    let mut hook = MockHook::new();
    hook.expect_on_booking_event().never();
    hook
}

async fn send(app: Router, method: &str, uri: &str, bearer: Option<String>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("Authorization", bearer);
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let mock_server = MockServer::start().await;
    let (status, body) = send(app(&mock_server, idle_hook()), "GET", "/bookings", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("authorization"));
}

#[tokio::test]
async fn test_create_booking_fires_created_event() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4().to_string();
    let row = MockDbResponses::booking_row(
        "bk-100",
        Some("confirmed"),
        Some(&therapist_id),
        "2025-03-03T10:00:00+05:30",
        "2025-03-03T11:00:00+05:30",
    );

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("booking_id", "eq.bk-100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut hook = MockHook::new();
    hook.expect_on_booking_event()
        .withf(|event| matches!(event, BookingEvent::Created(booking) if booking.booking_id == "bk-100"))
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = send(
        app(&mock_server, hook),
        "POST",
        "/bookings",
        Some(TestUser::integration().bearer()),
        Some(json!({
            "booking_id": "bk-100",
            "booking_status": "Confirmed",
            "booking_start_at": "2025-03-03 10:00:00",
            "booking_end_at": "2025-03-03 11:00:00",
            "therapist_id": therapist_id,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking_id"], "bk-100");
}

#[tokio::test]
async fn test_create_booking_succeeds_when_hook_fails() {
    let mock_server = MockServer::start().await;
    let row = MockDbResponses::booking_row("bk-101", Some("confirmed"), None, "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let mut hook = MockHook::new();
    hook.expect_on_booking_event()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("notifications table unavailable")));

    let (status, _) = send(
        app(&mock_server, hook),
        "POST",
        "/bookings",
        Some(TestUser::admin("ops@practice.example").bearer()),
        Some(json!({ "booking_id": "bk-101" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_duplicate_booking_conflicts() {
    let mock_server = MockServer::start().await;
    let row = MockDbResponses::booking_row("bk-102", Some("confirmed"), None, "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "POST",
        "/bookings",
        Some(TestUser::integration().bearer()),
        Some(json!({ "booking_id": "bk-102" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("bk-102"));
}

#[tokio::test]
async fn test_therapist_cannot_ingest_bookings() {
    let mock_server = MockServer::start().await;
    let (status, _) = send(
        app(&mock_server, idle_hook()),
        "POST",
        "/bookings",
        Some(TestUser::therapist("t@practice.example").bearer()),
        Some(json!({ "booking_id": "bk-103" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_update_fires_transition_event() {
    let mock_server = MockServer::start().await;
    let before = MockDbResponses::booking_row("bk-200", Some("confirmed"), None, "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");
    let after = MockDbResponses::booking_row("bk-200", Some("cancelled"), None, "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([before])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("booking_id", "eq.bk-200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([after])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut hook = MockHook::new();
    hook.expect_on_booking_event()
        .withf(|event| {
            matches!(
                event,
                BookingEvent::StatusChanged {
                    from: RawBookingStatus::Confirmed,
                    to: RawBookingStatus::Cancelled,
                    ..
                }
            )
        })
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = send(
        app(&mock_server, hook),
        "PUT",
        "/bookings/bk-200/status",
        Some(TestUser::integration().bearer()),
        Some(json!({ "booking_status": "canceled" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking_status"], "cancelled");
}

#[tokio::test]
async fn test_status_update_for_unknown_booking() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, _) = send(
        app(&mock_server, idle_hook()),
        "PUT",
        "/bookings/missing/status",
        Some(TestUser::integration().bearer()),
        Some(json!({ "booking_status": "no_show" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_derives_status_per_booking() {
    let mock_server = MockServer::start().await;
    let rows = json!([
        MockDbResponses::booking_row("bk-1", Some("canceled"), None, "2020-01-01T10:00:00Z", "2020-01-01T11:00:00Z"),
        MockDbResponses::booking_row("bk-2", Some("confirmed"), None, "2020-01-02T10:00:00Z", "2020-01-02T11:00:00Z"),
        MockDbResponses::booking_row("bk-3", Some("confirmed"), None, "2020-01-03T10:00:00Z", "2020-01-03T11:00:00Z"),
        MockDbResponses::booking_row("bk-4", Some("no show"), None, "2020-01-04T10:00:00Z", "2020-01-04T11:00:00Z"),
        MockDbResponses::booking_row("bk-5", Some("confirmed"), None, "2999-01-01T10:00:00Z", "2999-01-01T11:00:00Z"),
    ]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/session_notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "booking_id": "bk-1" },
            { "booking_id": "bk-3" },
            { "booking_id": "bk-4" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/bookings",
        Some(TestUser::admin("ops@practice.example").bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["effective_status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["cancelled", "pending_notes", "completed", "no_show", "scheduled"]);
    assert_eq!(
        body["counts"],
        json!({ "scheduled": 1, "completed": 1, "pending_notes": 1, "no_show": 1, "cancelled": 1 })
    );
}

#[tokio::test]
async fn test_dashboard_status_filter_keeps_full_counts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::booking_row("bk-1", Some("confirmed"), None, "2020-01-02T10:00:00Z", "2020-01-02T11:00:00Z"),
            MockDbResponses::booking_row("bk-2", Some("cancelled"), None, "2020-01-02T10:00:00Z", "2020-01-02T11:00:00Z"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/session_notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/bookings?status=pending_notes",
        Some(TestUser::admin("ops@practice.example").bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(body["counts"]["cancelled"], 1);
}

#[tokio::test]
async fn test_therapist_dashboard_is_scoped_to_self() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("therapist_id", format!("eq.{}", therapist.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(app(&mock_server, idle_hook()), "GET", "/bookings", Some(therapist.bearer()), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["scheduled"], 0);
}

#[tokio::test]
async fn test_live_sessions_count_rechecks_window_and_status() {
    let mock_server = MockServer::start().await;
    let rows = json!([
        MockDbResponses::booking_row("bk-1", Some("confirmed"), None, "2000-01-01T00:00:00Z", "2999-01-01T00:00:00Z"),
        MockDbResponses::booking_row("bk-2", Some("cancelled"), None, "2000-01-01T00:00:00Z", "2999-01-01T00:00:00Z"),
        MockDbResponses::booking_row("bk-3", None, None, "2000-01-01T00:00:00Z", "2999-01-01T00:00:00Z"),
    ]);
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/live-sessions-count",
        Some(TestUser::admin("ops@practice.example").bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body["as_of"].as_str().unwrap().ends_with("+05:30"));
}

#[tokio::test]
async fn test_live_sessions_count_uses_invitee_time_when_timestamps_missing() {
    let mock_server = MockServer::start().await;
    let now = booking_rules::now_ist();
    let (start, end) = (now - chrono::Duration::minutes(20), now + chrono::Duration::minutes(40));
    let invitee = format!(
        "{} at {} - {} IST",
        start.format("%A, %B %-d, %Y"),
        start.format("%-I:%M %p"),
        end.format("%-I:%M %p")
    );
    let mut invitee_only = MockDbResponses::booking_row("bk-inv", Some("confirmed"), None, "", "");
    invitee_only["booking_start_at"] = Value::Null;
    invitee_only["booking_end_at"] = Value::Null;
    invitee_only["booking_invitee_time"] = json!(invitee);

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([invitee_only])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/live-sessions-count",
        Some(TestUser::admin("ops@practice.example").bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    let filter = requests[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "or")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    assert!(filter.contains("booking_start_at.is.null"));
    assert!(filter.contains("booking_end_at.is.null"));
}

#[tokio::test]
async fn test_paperform_link_requires_booking_id() {
    let mock_server = MockServer::start().await;
    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/paperform-link",
        Some(TestUser::admin("ops@practice.example").bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_matches!(body["error"].as_str(), Some(msg) if msg.contains("booking_id"));
}

#[tokio::test]
async fn test_paperform_link_for_assigned_therapist() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");
    let row = MockDbResponses::booking_row(
        "bk-300",
        Some("confirmed"),
        Some(&therapist.id),
        "2025-03-03T10:00:00+05:30",
        "2025-03-03T11:00:00+05:30",
    );
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/paperform-link?booking_id=bk-300",
        Some(therapist.bearer()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://notes.paperform.test/session-note?booking_id=bk-300"));
    assert!(url.contains("session_date=2025-03-03"));

    let stranger = TestUser::therapist("other@practice.example");
    let (status, _) = send(
        app(&mock_server, idle_hook()),
        "GET",
        "/paperform-link?booking_id=bk-300",
        Some(stranger.bearer()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_second_session_note_conflicts() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");
    let row = MockDbResponses::booking_row("bk-400", Some("confirmed"), Some(&therapist.id), "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/session_notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "booking_id": "bk-400",
            "therapist_id": therapist.id,
            "client_id": null,
            "content": "Initial assessment",
            "created_at": "2025-03-03T06:00:00Z"
        }])))
        .mount(&mock_server)
        .await;

    let (status, _) = send(
        app(&mock_server, idle_hook()),
        "POST",
        "/session-notes",
        Some(therapist.bearer()),
        Some(json!({ "booking_id": "bk-400", "content": "Follow-up" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_session_note() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");
    let row = MockDbResponses::booking_row("bk-401", Some("confirmed"), Some(&therapist.id), "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z");
    let note_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/session_notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/session_notes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": note_id,
            "booking_id": "bk-401",
            "therapist_id": therapist.id,
            "client_id": "c0000000-0000-0000-0000-000000000001",
            "content": "Discussed sleep routine",
            "created_at": "2025-03-03T06:00:00Z"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server, idle_hook()),
        "POST",
        "/session-notes",
        Some(therapist.bearer()),
        Some(json!({ "booking_id": "bk-401", "content": "Discussed sleep routine" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], note_id.to_string());
}
