//! Ban trigger collaborator: a one-way notification to an external
//! enforcement action.

use crate::stores::StoreError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Port for invoking the external ban action for an address. The response,
/// if any, is logged but not required for correctness; failures are
/// surfaced to the caller and never retried in place.
#[async_trait]
pub trait BanTrigger: Send + Sync {
    async fn invoke(&self, address: &str) -> Result<(), StoreError>;
}

/// HTTP-backed ban trigger posting `{"address": ...}` to a configured
/// endpoint. A logged no-op when unconfigured.
pub struct HttpBanTrigger {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpBanTrigger {
    pub fn new(endpoint: Option<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl BanTrigger for HttpBanTrigger {
    async fn invoke(&self, address: &str) -> Result<(), StoreError> {
        let Some(endpoint) = &self.endpoint else {
            debug!(address = %address, "ban trigger endpoint not configured, skipping");
            return Ok(());
        };

        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "address": address }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(address = %address, status = %status, response = %body, "ban trigger invoked");
        Ok(())
    }
}
