//! API Response types
//!
//! Success bodies returned by the HTTP gateway. Failures use
//! [`crate::error::ErrorBody`].

use crate::models::{DatasetListing, PurchaseRequest};
use crate::request::UploadMetadata;
use serde::{Deserialize, Serialize};

/// `GET /data-requests`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequestsResponse {
    pub success: bool,
    pub requests: Vec<PurchaseRequest>,
}

/// `POST /data-requests` and `PUT /data-requests`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequestResponse {
    pub success: bool,
    pub message: String,
    pub request: PurchaseRequest,
}

/// `POST /upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Gateway URL of the stored content
    pub url: String,
    /// Content identifier
    pub hash: String,
    pub metadata: UploadMetadata,
    pub message: String,
    /// Present when the server recorded a listing for the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<DatasetListing>,
}

/// `GET /datasets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub success: bool,
    pub datasets: Vec<DatasetListing>,
}

/// `POST /datasets`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDatasetResponse {
    pub success: bool,
    pub message: String,
    pub dataset: DatasetListing,
    pub decrypt_url: String,
}
