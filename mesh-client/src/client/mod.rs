//! Marketplace gateway client
//!
//! [`MarketApi`] is what the pipelines and feeds talk to. [`MarketClient`]
//! implements it once over any [`HttpTransport`]:
//!
//! - [`NetworkHttpClient`]: reqwest against a running gateway
//! - [`OneshotHttpClient`]: in-process calls into an axum `Router`

mod http;
mod http_oneshot;

pub use self::http::NetworkHttpClient;
pub use self::http_oneshot::OneshotHttpClient;

use async_trait::async_trait;
use ::http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;
use shared::models::{Category, DatasetListing, PurchaseRequest, RequestStatus};
use shared::request::{CreateDataRequest, SaveDatasetRequest, UpdateRequestStatus, UploadRequest};
use shared::response::{
    DataRequestResponse, DataRequestsResponse, ListingsResponse, SaveDatasetResponse,
    UploadResponse,
};

use crate::error::{ClientError, ClientResult};

/// Status and body of a gateway response, before decoding
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Moves one JSON request to the gateway and back
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// `path` is relative to the gateway root and may carry a query string.
    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>)
    -> ClientResult<RawResponse>;
}

/// Typed operations of the marketplace gateway
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> ClientResult<UploadResponse>;

    async fn list_requests(&self, uploader_address: &str) -> ClientResult<Vec<PurchaseRequest>>;

    async fn create_request(&self, request: &CreateDataRequest) -> ClientResult<PurchaseRequest>;

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> ClientResult<PurchaseRequest>;

    async fn list_datasets(&self, category: Option<Category>) -> ClientResult<Vec<DatasetListing>>;

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> ClientResult<SaveDatasetResponse>;
}

/// [`MarketApi`] over an [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct MarketClient<H> {
    http: H,
}

impl<H: HttpTransport> MarketClient<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn transport(&self) -> &H {
        &self.http
    }

    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        decode(self.http.send(Method::GET, path, None).await?)
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(body)?;
        decode(self.http.send(method, path, Some(bytes)).await?)
    }
}

impl MarketClient<NetworkHttpClient> {
    /// Client for the gateway at `base_url`
    pub fn connect(base_url: &str) -> ClientResult<Self> {
        Ok(Self::new(NetworkHttpClient::new(base_url)?))
    }
}

#[async_trait]
impl<H: HttpTransport> MarketApi for MarketClient<H> {
    async fn upload(&self, request: &UploadRequest) -> ClientResult<UploadResponse> {
        self.send_json(Method::POST, "upload", request).await
    }

    async fn list_requests(&self, uploader_address: &str) -> ClientResult<Vec<PurchaseRequest>> {
        let path = with_query("data-requests", &[("uploaderAddress", uploader_address)])?;
        let response: DataRequestsResponse = self.get(&path).await?;
        Ok(response.requests)
    }

    async fn create_request(&self, request: &CreateDataRequest) -> ClientResult<PurchaseRequest> {
        let response: DataRequestResponse =
            self.send_json(Method::POST, "data-requests", request).await?;
        Ok(response.request)
    }

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> ClientResult<PurchaseRequest> {
        let body = UpdateRequestStatus {
            request_id: Some(request_id.to_string()),
            status: Some(status.as_str().to_string()),
        };
        let response: DataRequestResponse =
            self.send_json(Method::PUT, "data-requests", &body).await?;
        Ok(response.request)
    }

    async fn list_datasets(&self, category: Option<Category>) -> ClientResult<Vec<DatasetListing>> {
        let path = match category {
            Some(category) => with_query("datasets", &[("category", category.slug())])?,
            None => "datasets".to_string(),
        };
        let response: ListingsResponse = self.get(&path).await?;
        Ok(response.datasets)
    }

    async fn save_dataset(&self, request: &SaveDatasetRequest) -> ClientResult<SaveDatasetResponse> {
        self.send_json(Method::POST, "datasets", request).await
    }
}

/// Decode a success body, or turn an error body into [`ClientError::Api`].
pub(crate) fn decode<T: DeserializeOwned>(response: RawResponse) -> ClientResult<T> {
    if !(200..300).contains(&response.status) {
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(&response.body) {
            return Err(ClientError::Api(body.into_app_error()));
        }
        return Err(ClientError::Status {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Append a percent-encoded query string to a relative path.
fn with_query(path: &str, pairs: &[(&str, &str)]) -> ClientResult<String> {
    let mut url = reqwest::Url::parse("http://gateway/")
        .and_then(|base| base.join(path))
        .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(pairs);
    let query = url.query().unwrap_or_default();
    Ok(format!("{}?{query}", path.trim_start_matches('/')))
}
