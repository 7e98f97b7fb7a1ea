//! HTTP routes
//!
//! - [`health`] - liveness
//! - [`data_requests`] - purchase request records
//! - [`upload`] - off-chain storage upload proxy
//! - [`datasets`] - dataset listings

pub mod data_requests;
pub mod datasets;
pub mod extract;
pub mod health;
pub mod upload;

use axum::{Router, routing::get};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Any method a route does not serve
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}

/// Build the gateway router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(data_requests::router())
        .merge(upload::router())
        .merge(datasets::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
