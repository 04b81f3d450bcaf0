// libs/notification-cell/tests/handlers_test.rs
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::notification_routes;
use shared_utils::test_utils::{MockDbResponses, TestConfig, TestUser};

fn app(mock_server: &MockServer) -> Router {
    notification_routes(TestConfig::with_database(&mock_server.uri()).to_state())
}

async fn send(app: Router, method: &str, uri: &str, bearer: String, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", bearer)
        .header("Content-Type", "application/json");
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_list_own_notifications() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");

    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("user_id", format!("eq.{}", therapist.id)))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::notification_row(&Uuid::new_v4().to_string(), &therapist.id, "therapist"),
            MockDbResponses::notification_row(&Uuid::new_v4().to_string(), &therapist.id, "therapist"),
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("is_read", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server),
        "GET",
        &format!("/notifications?user_id={}&user_role=therapist", therapist.id),
        therapist.bearer(),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(body["unread_count"], 1);
}

#[tokio::test]
async fn test_cannot_list_someone_elses_notifications() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");

    let (status, body) = send(
        app(&mock_server),
        "GET",
        &format!("/notifications?user_id={}&user_role=therapist", Uuid::new_v4()),
        therapist.bearer(),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_mark_single_notification_read() {
    let mock_server = MockServer::start().await;
    let admin = TestUser::admin("ops@practice.example");
    let notification_id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("id", format!("eq.{}", notification_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::notification_row(&notification_id, &admin.id, "admin")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server),
        "PUT",
        "/notifications/read",
        admin.bearer(),
        Some(json!({ "notification_id": notification_id })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
}

#[tokio::test]
async fn test_mark_unknown_notification_read_is_not_found() {
    let mock_server = MockServer::start().await;
    let admin = TestUser::admin("ops@practice.example");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, _) = send(
        app(&mock_server),
        "PUT",
        "/notifications/read",
        admin.bearer(),
        Some(json!({ "notification_id": Uuid::new_v4() })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_all_read() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("is_read", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(app(&mock_server), "PUT", "/notifications/read", therapist.bearer(), Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 0);
}

#[tokio::test]
async fn test_delete_notification() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("meera@practice.example");
    let notification_id = Uuid::new_v4().to_string();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("id", format!("eq.{}", notification_id)))
        .and(query_param("user_id", format!("eq.{}", therapist.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockDbResponses::notification_row(&notification_id, &therapist.id, "therapist")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        app(&mock_server),
        "DELETE",
        &format!("/notifications/delete?notification_id={}", notification_id),
        therapist.bearer(),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
