//! In-process transport
//!
//! Calls an axum `Router` directly through `tower::ServiceExt::oneshot`,
//! with no socket in between. Used to run the client against a gateway
//! living in the same process.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request};
use tower::ServiceExt;

use super::{HttpTransport, RawResponse};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Router,
}

impl OneshotHttpClient {
    /// `router` must already have its state attached.
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl HttpTransport for OneshotHttpClient {
    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ClientResult<RawResponse> {
        let uri = format!("/{}", path.trim_start_matches('/'));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Oneshot call failed: {e}")))?;

        let status = response.status().as_u16();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to read body: {e}")))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
