//! Purchase Request Model

use super::Price;
use crate::error::{AppError, ErrorCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a purchase request
///
/// ```text
/// pending ──▶ approved ──▶ completed
///    └──────▶ rejected ──▶ completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Whether a request in `self` may be moved to `next`.
    ///
    /// Re-asserting the current status is allowed (it only refreshes `updated_at`).
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        *self == next
            || matches!(
                (self, next),
                (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Rejected, Completed)
            )
    }

    /// Check a transition, producing the error the API reports.
    pub fn ensure_transition(&self, next: RequestStatus) -> Result<(), AppError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Cannot change status from {self} to {next}"),
            )
            .with_detail("from", self.as_str())
            .with_detail("to", next.as_str()))
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(AppError::with_message(
                ErrorCode::InvalidStatus,
                format!("Invalid status: {other}"),
            )
            .with_detail("status", other)),
        }
    }
}

/// A buyer's request for access to a dataset (store row format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: String,
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_description: String,
    pub cid: String,
    pub requester_address: String,
    /// Publisher of the dataset
    pub uploader_address: String,
    /// Category label as sent by the client
    pub category: String,
    pub size: String,
    pub price: Price,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields of a purchase request before the store assigns id, status and times
#[derive(Debug, Clone)]
pub struct NewPurchaseRequest {
    pub dataset_id: String,
    pub dataset_name: String,
    pub dataset_description: String,
    pub cid: String,
    pub requester_address: String,
    pub uploader_address: String,
    pub category: String,
    pub size: String,
    pub price: Price,
}

impl NewPurchaseRequest {
    /// Materialize as a fresh `pending` request.
    pub fn into_request(self, id: String, now: DateTime<Utc>) -> PurchaseRequest {
        PurchaseRequest {
            id,
            dataset_id: self.dataset_id,
            dataset_name: self.dataset_name,
            dataset_description: self.dataset_description,
            cid: self.cid,
            requester_address: self.requester_address,
            uploader_address: self.uploader_address,
            category: self.category,
            size: self.size,
            price: self.price,
            status: RequestStatus::Pending,
            requested_at: now,
            created_at: now,
            updated_at: None,
        }
    }
}
