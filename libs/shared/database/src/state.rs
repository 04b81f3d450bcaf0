use std::sync::Arc;

use reqwest::Client;
use shared_config::AppConfig;

use crate::postgrest::PostgrestClient;

/// Process-wide state handed to every router.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Arc<PostgrestClient>,
    /// Pooled client for outbound calls other than the database.
    pub http: Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = Arc::new(PostgrestClient::new(&config));
        Self {
            config,
            db,
            http: Client::new(),
        }
    }

    pub fn shared(config: AppConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}
