//! Optional webhook sink receiving batches of suspicious reports.

use crate::models::SuspiciousReport;
use crate::stores::StoreError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Port for best-effort delivery of suspicious-activity batches. Delivery
/// is independent of log durability; failures are logged by the caller and
/// never roll anything back.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, reports: &[SuspiciousReport]) -> Result<(), StoreError>;
}

/// HTTP-backed webhook sink posting the batch as a JSON array. A silent
/// no-op when no endpoint is configured.
pub struct HttpWebhookSink {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpWebhookSink {
    pub fn new(endpoint: Option<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn deliver(&self, reports: &[SuspiciousReport]) -> Result<(), StoreError> {
        let Some(endpoint) = &self.endpoint else {
            debug!("webhook endpoint not configured, skipping delivery");
            return Ok(());
        };

        self.client
            .post(endpoint)
            .json(reports)
            .send()
            .await?
            .error_for_status()?;
        debug!(count = reports.len(), endpoint = %endpoint, "suspicious batch delivered to webhook");
        Ok(())
    }
}
