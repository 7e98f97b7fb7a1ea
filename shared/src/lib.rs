//! Shared types for the data marketplace
//!
//! Domain models, wire types, error codes and the seed catalogue used by
//! both the gateway and the client pipelines.

pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod seed;
pub mod size;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
