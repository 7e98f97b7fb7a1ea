//! Dataset API module

mod handler;

use axum::{Router, routing::get};

use super::method_not_allowed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/datasets",
            get(handler::list)
                .post(handler::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/datasets/{id}",
            get(handler::get_by_id).fallback(method_not_allowed),
        )
}
