//! Data Request API module

mod handler;

use axum::{Router, routing::get};

use super::method_not_allowed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/data-requests",
        get(handler::list)
            .post(handler::create)
            .put(handler::update_status)
            .fallback(method_not_allowed),
    )
}
