//! Lighthouse storage node via REST API (no SDK dependency)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{StorageClient, StorageError, StoredObject};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `POST /api/v0/add` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    name: String,
    hash: String,
    /// Reported as a decimal string
    size: String,
}

#[derive(Clone)]
pub struct LighthouseClient {
    client: reqwest::Client,
    node_url: String,
    gateway_url: String,
}

impl LighthouseClient {
    pub fn new(node_url: &str, gateway_url: &str) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            node_url: node_url.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for LighthouseClient {
    async fn upload(
        &self,
        api_key: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let form = Form::new().part(
            "file",
            Part::bytes(bytes)
                .file_name(name.to_string())
                .mime_str("application/json")?,
        );

        let resp = self
            .client
            .post(format!("{}/api/v0/add", self.node_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let added: AddResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        if added.hash.is_empty() {
            return Err(StorageError::InvalidResponse("empty content hash".into()));
        }

        tracing::info!(hash = %added.hash, size = %added.size, "Stored object on Lighthouse");
        Ok(StoredObject {
            size: added.size.parse().unwrap_or_default(),
            name: added.name,
            hash: added.hash,
        })
    }

    fn gateway_url(&self, hash: &str) -> String {
        format!("{}/ipfs/{hash}", self.gateway_url)
    }
}
