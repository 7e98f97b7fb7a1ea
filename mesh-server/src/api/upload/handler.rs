//! Upload API Handlers

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, DatasetListing, NewListing};
use shared::request::{UploadMetadata, UploadRequest};
use shared::response::UploadResponse;
use shared::util::slugify;

use crate::config::STORAGE_KEY_VAR;
use crate::state::AppState;
use crate::storage::StoredObject;

/// POST /upload - forward a dataset to off-chain storage
///
/// The storage credential is checked before the body is even parsed, so a
/// misconfigured gateway answers 500 for every upload.
pub async fn upload(State(state): State<AppState>, body: Bytes) -> AppResult<Json<UploadResponse>> {
    let api_key = state.credential.current().ok_or_else(|| {
        tracing::error!("{STORAGE_KEY_VAR} is not configured");
        AppError::with_message(
            ErrorCode::StorageUnconfigured,
            "Storage API key not configured",
        )
    })?;

    let request: UploadRequest = serde_json::from_slice(&body).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Invalid request body: {e}"))
    })?;
    let (data, metadata) = validate(request.data, request.metadata)?;

    let payload = serde_json::to_vec(&data)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, e.to_string()))?;
    let file_name = format!("{}.json", slugify(&metadata.name));

    let stored = state.storage.upload(&api_key, &file_name, payload).await?;
    tracing::info!(hash = %stored.hash, size = stored.size, name = %metadata.name, "Dataset uploaded");

    let listing = match request.uploader_address.filter(|a| !a.trim().is_empty()) {
        Some(uploader) => record_listing(&state, &metadata, &stored, uploader).await,
        None => None,
    };

    Ok(Json(UploadResponse {
        success: true,
        url: state.storage.gateway_url(&stored.hash),
        hash: stored.hash,
        metadata,
        message: "Data uploaded to IPFS successfully".into(),
        listing,
    }))
}

fn validate(
    data: Option<Value>,
    metadata: Option<UploadMetadata>,
) -> AppResult<(Value, UploadMetadata)> {
    let data = data
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::required("data"))?;
    let metadata = metadata.ok_or_else(|| AppError::required("metadata"))?;

    let missing = metadata.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("Missing metadata fields: {}", missing.join(", ")),
        )
        .with_detail("fields", missing));
    }
    Ok((data, metadata))
}

/// Record the listing for a stored upload. Failure never fails the upload.
async fn record_listing(
    state: &AppState,
    metadata: &UploadMetadata,
    stored: &StoredObject,
    uploader: String,
) -> Option<DatasetListing> {
    let category: Category = match metadata.category.parse() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Upload stored without listing");
            return None;
        }
    };
    let company = metadata
        .company
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| uploader.clone());

    let listing = NewListing {
        name: metadata.name.clone(),
        description: metadata.description.clone(),
        category,
        content_id: stored.hash.clone(),
        size_bytes: stored.size,
        publisher: uploader,
        company: company.clone(),
    }
    .into_listing(state.ids.listing_id(&company), state.price_policy, Utc::now());

    match state.store.create_listing(listing).await {
        Ok(listing) => Some(listing),
        Err(e) => {
            tracing::warn!(error = %e, hash = %stored.hash, "Failed to record listing for upload");
            None
        }
    }
}
