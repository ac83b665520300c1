//! HTTP client for the external record store. Only the create operation is
//! needed by this layer; reads belong to the nurse-facing service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::AssistantError;
use crate::traits::RequestStore;
use crate::types::AssistanceRequestRecord;

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpRequestStore {
    client: Client,
    base_url: String,
}

impl HttpRequestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(STORE_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RequestStore for HttpRequestStore {
    async fn create_assistance_request(
        &self,
        record: &AssistanceRequestRecord,
    ) -> anyhow::Result<()> {
        let url = format!("{}/api/requests", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| AssistantError::PersistenceFailure {
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Record store rejected request: {}", body);
            return Err(AssistantError::PersistenceFailure {
                message: format!("record store returned {}", status),
            }
            .into());
        }

        info!(
            priority = %record.priority,
            department = %record.department,
            room = %record.room,
            "Assistance request persisted"
        );
        Ok(())
    }
}
