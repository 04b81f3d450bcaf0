use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_SOS_ELIGIBILITY_WINDOW_HOURS: i64 = 24;
pub const DEFAULT_SOS_TOKEN_TTL_HOURS: i64 = 72;
pub const SOS_ELIGIBILITY_WINDOW_HOURS_RANGE: (i64, i64) = (0, 720);
pub const SOS_TOKEN_TTL_HOURS_RANGE: (i64, i64) = (1, 720);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_service_key: String,
    pub jwt_secret: String,
    pub server_port: u16,
    pub sos_eligibility_window_hours: i64,
    pub sos_token_ttl_hours: i64,
    pub n8n_sos_webhook_url: Option<String>,
    pub paperform_base_url: String,
    pub object_storage_endpoint: String,
    pub email_sender: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_URL not set, using empty value");
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: parse_or_default("SERVER_PORT", DEFAULT_SERVER_PORT),
            sos_eligibility_window_hours: clamp_hours(
                "SOS_ELIGIBILITY_WINDOW_HOURS",
                parse_or_default("SOS_ELIGIBILITY_WINDOW_HOURS", DEFAULT_SOS_ELIGIBILITY_WINDOW_HOURS),
                SOS_ELIGIBILITY_WINDOW_HOURS_RANGE,
            ),
            sos_token_ttl_hours: clamp_hours(
                "SOS_TOKEN_TTL_HOURS",
                parse_or_default("SOS_TOKEN_TTL_HOURS", DEFAULT_SOS_TOKEN_TTL_HOURS),
                SOS_TOKEN_TTL_HOURS_RANGE,
            ),
            n8n_sos_webhook_url: env::var("N8N_SOS_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            paperform_base_url: env::var("PAPERFORM_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("PAPERFORM_BASE_URL not set, using empty value");
                    String::new()
                }),
            object_storage_endpoint: env::var("OBJECT_STORAGE_ENDPOINT")
                .unwrap_or_else(|_| {
                    warn!("OBJECT_STORAGE_ENDPOINT not set, using empty value");
                    String::new()
                }),
            email_sender: env::var("EMAIL_SENDER")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_SENDER not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if config.n8n_sos_webhook_url.is_none() {
            warn!("N8N_SOS_WEBHOOK_URL not set, SOS escalations will not be forwarded");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_paperform_configured(&self) -> bool {
        !self.paperform_base_url.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn clamp_hours(key: &str, value: i64, (min, max): (i64, i64)) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{}={} is outside {}..={}, using {}", key, value, min, max, clamped);
    }
    clamped
}
