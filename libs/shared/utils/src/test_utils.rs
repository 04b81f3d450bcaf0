use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::AppState;
use shared_models::auth::User;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_service_key: String,
    pub n8n_sos_webhook_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            database_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            n8n_sos_webhook_url: None,
        }
    }
}

impl TestConfig {
    /// Points the database (and optionally the n8n webhook) at a mock server.
    pub fn with_database(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_webhook(mut self, webhook_url: &str) -> Self {
        self.n8n_sos_webhook_url = Some(webhook_url.to_string());
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_service_key: self.database_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
            sos_eligibility_window_hours: 24,
            sos_token_ttl_hours: 72,
            n8n_sos_webhook_url: self.n8n_sos_webhook_url.clone(),
            paperform_base_url: "https://notes.paperform.test/session-note".to_string(),
            object_storage_endpoint: String::new(),
            email_sender: String::new(),
        }
    }

    pub fn to_state(&self) -> Arc<AppState> {
        AppState::shared(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "client".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn therapist(email: &str) -> Self {
        Self::new(email, "therapist")
    }

    pub fn client(email: &str) -> Self {
        Self::new(email, "client")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn integration() -> Self {
        Self::new("scheduler@integration.local", "integration")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", JwtTestUtils::create_test_token(self, TEST_JWT_SECRET, Some(1)))
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Canned PostgREST rows for the practice tables.
pub struct MockDbResponses;

impl MockDbResponses {
    pub fn booking_row(
        booking_id: &str,
        status: Option<&str>,
        therapist_id: Option<&str>,
        start_at: &str,
        end_at: &str,
    ) -> serde_json::Value {
        json!({
            "booking_id": booking_id,
            "booking_status": status,
            "refund_status": null,
            "booking_start_at": start_at,
            "booking_end_at": end_at,
            "booking_invitee_time": null,
            "client_id": "c0000000-0000-0000-0000-000000000001",
            "client_name": "Asha Rao",
            "therapist_id": therapist_id,
            "therapist_name": "Dr. Meera Iyer",
            "created_at": "2025-03-01T08:00:00Z"
        })
    }

    pub fn therapist_row(therapist_id: &str) -> serde_json::Value {
        json!({
            "therapist_id": therapist_id,
            "name": "Dr. Meera Iyer",
            "email": "meera@practice.example",
            "phone": null
        })
    }

    pub fn admin_row(user_id: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "email": format!("{}@practice.example", user_id),
            "role": "admin"
        })
    }

    pub fn notification_row(id: &str, user_id: &str, user_role: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "user_role": user_role,
            "event_type": "booking_created",
            "title": "New booking",
            "message": "Asha Rao booked a session",
            "booking_id": "b-1",
            "is_read": false,
            "created_at": "2025-03-01T08:00:00Z"
        })
    }
}
