//! Record store: purchase requests and dataset listings
//!
//! [`RecordStore`] is the seam between the HTTP routes and persistence.
//! [`PgRecordStore`] backs it with Postgres; [`MemoryRecordStore`] keeps
//! everything in process for development and tests.

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppError;
use shared::models::{Category, DatasetListing, PurchaseRequest, RequestStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    /// The write was refused by a domain rule (e.g. a status transition).
    #[error(transparent)]
    Rejected(AppError),

    /// Stored row could not be mapped back into a model.
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Requests addressed to `uploader_address`, newest first.
    async fn list_requests(&self, uploader_address: &str) -> StoreResult<Vec<PurchaseRequest>>;

    /// Persist a freshly built `pending` request and return the stored row.
    async fn create_request(&self, request: PurchaseRequest) -> StoreResult<PurchaseRequest>;

    /// Move a request to `status`, stamping `updated_at = now`.
    ///
    /// The transition check and the write are one conditional update.
    async fn update_request_status(
        &self,
        id: &str,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<PurchaseRequest>;

    async fn create_listing(&self, listing: DatasetListing) -> StoreResult<DatasetListing>;

    /// Listings, optionally restricted to one category, newest first.
    async fn list_listings(&self, category: Option<Category>) -> StoreResult<Vec<DatasetListing>>;

    async fn get_listing(&self, id: &str) -> StoreResult<Option<DatasetListing>>;
}
