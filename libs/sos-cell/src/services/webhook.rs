// libs/sos-cell/src/services/webhook.rs
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::SosWebhookPayload;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the n8n SOS escalation workflow. Delivery is best effort:
/// failures are logged and never propagate to the caller.
pub struct SosWebhook {
    client: Client,
    url: Option<String>,
}

impl SosWebhook {
    /// `client` is the process-wide pooled client from `AppState`.
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            url: config
                .n8n_sos_webhook_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
        }
    }

    pub async fn notify(&self, payload: &SosWebhookPayload) {
        let Some(url) = self.url.as_deref() else {
            debug!("SOS webhook not configured; skipping assessment {}", payload.assessment_id);
            return;
        };

        match self.post(url, payload).await {
            Ok(()) => info!("SOS webhook delivered for assessment {}", payload.assessment_id),
            Err(e) => warn!("SOS webhook failed for assessment {}: {}", payload.assessment_id, e),
        }
    }

    async fn post(&self, url: &str, payload: &SosWebhookPayload) -> Result<()> {
        let response = self
            .client
            .post(url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {}: {}", status, body));
        }
        Ok(())
    }
}
