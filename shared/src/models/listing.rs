//! Dataset Listing Model

use super::{Category, Price, PricePolicy};
use crate::size::format_size;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published dataset
///
/// `content_id` and `price` are fixed at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetListing {
    pub id: String,
    pub name: String,
    /// Publisher display name
    pub company: String,
    pub description: String,
    pub category: Category,
    pub content_id: String,
    pub size_bytes: u64,
    /// Display label, e.g. "1.5 GB"
    pub size: String,
    /// Publisher wallet address
    pub publisher: String,
    pub price: Price,
    pub downloads: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when a listing is created
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub company: String,
    pub description: String,
    pub category: Category,
    pub content_id: String,
    pub size_bytes: u64,
    pub publisher: String,
}

impl NewListing {
    /// Build the listing, deriving the size label and the price once.
    pub fn into_listing(
        self,
        id: String,
        policy: PricePolicy,
        created_at: DateTime<Utc>,
    ) -> DatasetListing {
        DatasetListing {
            id,
            size: format_size(self.size_bytes),
            price: policy.derive(self.size_bytes),
            name: self.name,
            company: self.company,
            description: self.description,
            category: self.category,
            content_id: self.content_id,
            size_bytes: self.size_bytes,
            publisher: self.publisher,
            downloads: 0,
            created_at,
        }
    }
}
