//! Off-chain storage upload API
//!
//! The gateway forwards upload payloads to a content-addressed storage node
//! and hands back the content identifier.

mod lighthouse;
mod memory;

pub use lighthouse::LighthouseClient;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage node rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid storage response: {0}")]
    InvalidResponse(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// An object accepted by the storage node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    /// Content identifier
    pub hash: String,
    pub size: u64,
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload `bytes` under `name`, authenticated with `api_key`.
    async fn upload(
        &self,
        api_key: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError>;

    /// Public URL at which `hash` can be fetched.
    fn gateway_url(&self, hash: &str) -> String;
}
