//! Dataset API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, DatasetListing, NewListing};
use shared::request::{ListingsQuery, SaveDatasetRequest};
use shared::response::{ListingsResponse, SaveDatasetResponse};

use crate::api::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch datasets";
const SAVE_FAILED: &str = "Failed to save dataset record";
const MISSING_FIELDS: &str = "Missing required fields: category, companyName, dataName, dataDescription, ipfsHash, timestamp, fileSize, uploaderAddress";

/// GET /datasets?category= - published listings, or the seed catalogue
/// while nothing has been published
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingsQuery>,
) -> AppResult<Json<ListingsResponse>> {
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.parse::<Category>())
        .transpose()?;

    let mut datasets = state
        .store
        .list_listings(category)
        .await
        .map_err(|e| e.into_app_error(FETCH_FAILED))?;

    if datasets.is_empty() && store_is_empty(&state, category).await? {
        datasets = state
            .seed
            .listings
            .iter()
            .filter(|l| category.is_none_or(|c| l.category == c))
            .cloned()
            .collect();
    }

    Ok(Json(ListingsResponse {
        success: true,
        datasets,
    }))
}

/// Whether nothing has been published in any category. `filtered` is the
/// filter of a read that already came back empty.
async fn store_is_empty(state: &AppState, filtered: Option<Category>) -> AppResult<bool> {
    if filtered.is_none() {
        return Ok(true);
    }
    let all = state
        .store
        .list_listings(None)
        .await
        .map_err(|e| e.into_app_error(FETCH_FAILED))?;
    Ok(all.is_empty())
}

/// GET /datasets/{id} - one listing, from the store or the seed catalogue
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DatasetListing>> {
    let stored = state
        .store
        .get_listing(&id)
        .await
        .map_err(|e| e.into_app_error(FETCH_FAILED))?;
    stored
        .or_else(|| state.seed.listings.iter().find(|l| l.id == id).cloned())
        .map(Json)
        .ok_or_else(|| {
            AppError::new(ErrorCode::DatasetNotFound).with_detail("id", id)
        })
}

/// POST /datasets - register a dataset that is already in storage
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SaveDatasetRequest>,
) -> AppResult<Json<SaveDatasetResponse>> {
    let (new, created_at) = into_new_listing(payload)?;
    let id = state.ids.listing_id(&new.company);
    let listing = new.into_listing(id, state.price_policy, created_at);

    let dataset = state
        .store
        .create_listing(listing)
        .await
        .map_err(|e| e.into_app_error(SAVE_FAILED))?;

    tracing::info!(id = %dataset.id, content_id = %dataset.content_id, price = %dataset.price, "Dataset saved");

    Ok(Json(SaveDatasetResponse {
        success: true,
        message: "Dataset successfully saved to database".into(),
        decrypt_url: state.decrypt_url(&dataset.content_id),
        dataset,
    }))
}

fn into_new_listing(payload: SaveDatasetRequest) -> AppResult<(NewListing, DateTime<Utc>)> {
    let text = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (
        Some(category),
        Some(company),
        Some(name),
        Some(description),
        Some(content_id),
        Some(timestamp),
        Some(size_bytes),
        Some(publisher),
    ) = (
        text(payload.category),
        text(payload.company_name),
        text(payload.data_name),
        text(payload.data_description),
        text(payload.ipfs_hash),
        text(payload.timestamp),
        payload.file_size.filter(|n| *n > 0),
        text(payload.uploader_address),
    )
    else {
        return Err(AppError::with_message(ErrorCode::RequiredField, MISSING_FIELDS));
    };

    let category: Category = category.parse()?;
    let created_at = DateTime::parse_from_rfc3339(&timestamp)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok((
        NewListing {
            name,
            company,
            description,
            category,
            content_id,
            size_bytes,
            publisher,
        },
        created_at,
    ))
}
