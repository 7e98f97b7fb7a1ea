//! Upload API module

mod handler;

use axum::{Router, routing::post};

use super::method_not_allowed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(handler::upload).fallback(method_not_allowed),
    )
}
