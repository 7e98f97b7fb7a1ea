//! Data Request API Handlers

use axum::{Json, extract::State};
use chrono::Utc;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{NewPurchaseRequest, RequestStatus};
use shared::request::{CreateDataRequest, DataRequestQuery, UpdateRequestStatus};
use shared::response::{DataRequestResponse, DataRequestsResponse};

use crate::api::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch data requests";
const CREATE_FAILED: &str = "Failed to create data request";
const UPDATE_FAILED: &str = "Failed to update request status";

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /data-requests?uploaderAddress= - requests addressed to a publisher
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DataRequestQuery>,
) -> AppResult<Json<DataRequestsResponse>> {
    let uploader = present(query.uploader_address).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RequiredField,
            "uploaderAddress parameter is required",
        )
    })?;

    let requests = state
        .store
        .list_requests(&uploader)
        .await
        .map_err(|e| e.into_app_error(FETCH_FAILED))?;

    Ok(Json(DataRequestsResponse {
        success: true,
        requests,
    }))
}

/// POST /data-requests - raise a purchase request
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateDataRequest>,
) -> AppResult<Json<DataRequestResponse>> {
    if payload.oyd_cost.is_sign_negative() {
        return Err(AppError::with_message(
            ErrorCode::InvalidPrice,
            "oydCost must not be negative",
        ));
    }

    let new: NewPurchaseRequest = payload.into();
    let request = new.into_request(state.ids.request_id(), Utc::now());
    let request = state
        .store
        .create_request(request)
        .await
        .map_err(|e| e.into_app_error(CREATE_FAILED))?;

    tracing::info!(
        id = %request.id,
        dataset_id = %request.dataset_id,
        requester = %request.requester_address,
        "Data request created"
    );

    Ok(Json(DataRequestResponse {
        success: true,
        message: "Data request created successfully".into(),
        request,
    }))
}

/// PUT /data-requests - move a request along its status lifecycle
pub async fn update_status(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateRequestStatus>,
) -> AppResult<Json<DataRequestResponse>> {
    let (Some(request_id), Some(status)) = (present(payload.request_id), present(payload.status))
    else {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "requestId and status are required",
        ));
    };
    let status: RequestStatus = status.parse()?;

    let request = state
        .store
        .update_request_status(&request_id, status, Utc::now())
        .await
        .map_err(|e| e.into_app_error(UPDATE_FAILED))?;

    tracing::info!(id = %request.id, status = %request.status, "Data request status updated");

    Ok(Json(DataRequestResponse {
        success: true,
        message: "Request status updated successfully".into(),
        request,
    }))
}
