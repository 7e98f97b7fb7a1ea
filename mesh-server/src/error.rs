//! Bridges from layer errors to the API error
//!
//! Each route owns a generic failure message ("Failed to fetch data
//! requests", ...). Infrastructure errors are logged with their cause and
//! reported under that message; domain rejections pass through unchanged.

use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;
use crate::storage::StorageError;

impl StoreError {
    /// Convert into the API error a route reports, using `context` as the
    /// message for infrastructure failures.
    pub fn into_app_error(self, context: &'static str) -> AppError {
        match self {
            StoreError::Rejected(app_err) => app_err,
            other => {
                tracing::error!(error = %other, "{context}");
                AppError::database(context)
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        tracing::error!(error = %e, "Storage upload failed");
        AppError::new(ErrorCode::UploadFailed)
    }
}
