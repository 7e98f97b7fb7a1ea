//! Request types for the shared crate
//!
//! Bodies and query strings accepted by the HTTP gateway. Field names are
//! camelCase on the wire.

use crate::models::{NewPurchaseRequest, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /data-requests?uploaderAddress=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequestQuery {
    #[serde(default)]
    pub uploader_address: Option<String>,
}

/// `POST /data-requests`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataRequest {
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_description: String,
    pub cid: String,
    pub requester_address: String,
    pub uploader_address: String,
    pub category: String,
    pub size: String,
    /// Price in OYD datacoins
    pub oyd_cost: Decimal,
}

impl From<CreateDataRequest> for NewPurchaseRequest {
    fn from(body: CreateDataRequest) -> Self {
        Self {
            dataset_id: body.dataset_id,
            dataset_name: body.dataset_name,
            dataset_description: body.dataset_description,
            cid: body.cid,
            requester_address: body.requester_address,
            uploader_address: body.uploader_address,
            category: body.category,
            size: body.size,
            price: Price::new(crate::models::Currency::Oyd, body.oyd_cost),
        }
    }
}

/// `PUT /data-requests`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatus {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Metadata sent alongside an upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadMetadata {
    pub name: String,
    pub description: String,
    #[serde(rename = "priceETH")]
    pub price_eth: String,
    #[serde(rename = "priceUSDC")]
    pub price_usdc: String,
    pub category: String,
    /// Publisher display name; the uploader address stands in when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl UploadMetadata {
    /// Names of required fields that are blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("priceETH", &self.price_eth),
            ("priceUSDC", &self.price_usdc),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// `POST /upload`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub metadata: Option<UploadMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_address: Option<String>,
}

/// `GET /datasets?category=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingsQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// `POST /datasets`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDatasetRequest {
    pub category: Option<String>,
    pub company_name: Option<String>,
    pub data_name: Option<String>,
    pub data_description: Option<String>,
    pub ipfs_hash: Option<String>,
    pub timestamp: Option<String>,
    pub file_size: Option<u64>,
    pub uploader_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_metadata_wire_names() {
        let meta: UploadMetadata = serde_json::from_str(
            r#"{"name":"n","description":"d","priceETH":"0.1","priceUSDC":"10","category":"Finance"}"#,
        )
        .unwrap();
        assert_eq!(meta.price_eth, "0.1");
        assert_eq!(meta.price_usdc, "10");
        assert!(meta.missing_fields().is_empty());
    }

    #[test]
    fn test_upload_metadata_missing_fields() {
        let meta: UploadMetadata =
            serde_json::from_str(r#"{"name":"n","priceETH":" "}"#).unwrap();
        assert_eq!(
            meta.missing_fields(),
            vec!["description", "priceETH", "priceUSDC", "category"]
        );
    }

    #[test]
    fn test_create_data_request_into_new() {
        let body: CreateDataRequest = serde_json::from_value(serde_json::json!({
            "datasetId": "1mg-1",
            "datasetName": "1mg",
            "datasetDescription": "Healthcare purchases",
            "cid": "Qm1mg",
            "requesterAddress": "0xbuyer",
            "uploaderAddress": "0xseller",
            "category": "Pharmacy",
            "size": "900 MB",
            "oydCost": 900
        }))
        .unwrap();
        let new: NewPurchaseRequest = body.into();
        assert_eq!(new.price, Price::oyd(900));
        assert_eq!(new.uploader_address, "0xseller");
    }
}
