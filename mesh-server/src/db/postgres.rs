use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Category, DatasetListing, Price, PurchaseRequest, RequestStatus};
use sqlx::PgPool;

use super::{RecordStore, StoreError, StoreResult};

/// Re-reads allowed when a concurrent writer changes the status between the
/// transition check and the conditional update.
const UPDATE_ATTEMPTS: usize = 3;

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: String,
    dataset_id: String,
    dataset_name: String,
    dataset_description: String,
    cid: String,
    requester_address: String,
    uploader_address: String,
    category: String,
    size: String,
    price_unit: String,
    price_amount: Decimal,
    status: String,
    requested_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestRow> for PurchaseRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: row.id.clone(),
            reason,
        };
        let status: RequestStatus = row.status.parse().map_err(|e: shared::AppError| corrupt(e.message))?;
        let unit = row.price_unit.parse().map_err(|e: shared::AppError| corrupt(e.message))?;
        Ok(PurchaseRequest {
            price: Price::new(unit, row.price_amount),
            status,
            id: row.id,
            dataset_id: row.dataset_id,
            dataset_name: row.dataset_name,
            dataset_description: row.dataset_description,
            cid: row.cid,
            requester_address: row.requester_address,
            uploader_address: row.uploader_address,
            category: row.category,
            size: row.size,
            requested_at: row.requested_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: String,
    name: String,
    company: String,
    description: String,
    category: String,
    content_id: String,
    size_bytes: i64,
    size: String,
    publisher: String,
    price_unit: String,
    price_amount: Decimal,
    downloads: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for DatasetListing {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: row.id.clone(),
            reason,
        };
        let category: Category = row.category.parse().map_err(|e: shared::AppError| corrupt(e.message))?;
        let unit = row.price_unit.parse().map_err(|e: shared::AppError| corrupt(e.message))?;
        Ok(DatasetListing {
            category,
            price: Price::new(unit, row.price_amount),
            size_bytes: u64::try_from(row.size_bytes).unwrap_or_default(),
            downloads: u64::try_from(row.downloads).unwrap_or_default(),
            id: row.id,
            name: row.name,
            company: row.company,
            description: row.description,
            content_id: row.content_id,
            size: row.size,
            publisher: row.publisher,
            created_at: row.created_at,
        })
    }
}

/// Postgres-backed [`RecordStore`]
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_request(&self, id: &str) -> StoreResult<Option<RequestRow>> {
        Ok(sqlx::query_as("SELECT * FROM data_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_requests(&self, uploader_address: &str) -> StoreResult<Vec<PurchaseRequest>> {
        let rows: Vec<RequestRow> = sqlx::query_as(
            "SELECT * FROM data_requests WHERE uploader_address = $1
             ORDER BY requested_at DESC, id DESC",
        )
        .bind(uploader_address)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PurchaseRequest::try_from).collect()
    }

    async fn create_request(&self, request: PurchaseRequest) -> StoreResult<PurchaseRequest> {
        let row: RequestRow = sqlx::query_as(
            "INSERT INTO data_requests (
                id, dataset_id, dataset_name, dataset_description, cid,
                requester_address, uploader_address, category, size,
                price_unit, price_amount, status, requested_at, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING *",
        )
        .bind(&request.id)
        .bind(&request.dataset_id)
        .bind(&request.dataset_name)
        .bind(&request.dataset_description)
        .bind(&request.cid)
        .bind(&request.requester_address)
        .bind(&request.uploader_address)
        .bind(&request.category)
        .bind(&request.size)
        .bind(request.price.unit.code())
        .bind(request.price.amount)
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_request_status(
        &self,
        id: &str,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<PurchaseRequest> {
        for _ in 0..UPDATE_ATTEMPTS {
            let current: PurchaseRequest = self
                .find_request(id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("data request {id}")))?
                .try_into()?;
            current
                .status
                .ensure_transition(status)
                .map_err(StoreError::Rejected)?;

            let updated: Option<RequestRow> = sqlx::query_as(
                "UPDATE data_requests SET status = $2, updated_at = $3
                 WHERE id = $1 AND status = $4
                 RETURNING *",
            )
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .bind(current.status.as_str())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = updated {
                return row.try_into();
            }
            tracing::debug!(id, "status changed concurrently, re-reading");
        }
        Err(StoreError::Unavailable(format!(
            "data request {id} kept changing during update"
        )))
    }

    async fn create_listing(&self, listing: DatasetListing) -> StoreResult<DatasetListing> {
        let row: ListingRow = sqlx::query_as(
            "INSERT INTO datasets (
                id, name, company, description, category, content_id, size_bytes,
                size, publisher, price_unit, price_amount, downloads, created_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *",
        )
        .bind(&listing.id)
        .bind(&listing.name)
        .bind(&listing.company)
        .bind(&listing.description)
        .bind(listing.category.label())
        .bind(&listing.content_id)
        .bind(i64::try_from(listing.size_bytes).unwrap_or(i64::MAX))
        .bind(&listing.size)
        .bind(&listing.publisher)
        .bind(listing.price.unit.code())
        .bind(listing.price.amount)
        .bind(i64::try_from(listing.downloads).unwrap_or(i64::MAX))
        .bind(listing.created_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn list_listings(&self, category: Option<Category>) -> StoreResult<Vec<DatasetListing>> {
        let rows: Vec<ListingRow> = match category {
            Some(category) => {
                sqlx::query_as(
                    "SELECT * FROM datasets WHERE category = $1
                     ORDER BY created_at DESC, id DESC",
                )
                .bind(category.label())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM datasets ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(DatasetListing::try_from).collect()
    }

    async fn get_listing(&self, id: &str) -> StoreResult<Option<DatasetListing>> {
        let row: Option<ListingRow> = sqlx::query_as("SELECT * FROM datasets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DatasetListing::try_from).transpose()
    }
}
