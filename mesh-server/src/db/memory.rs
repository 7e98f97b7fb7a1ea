use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppError;
use shared::models::{Category, DatasetListing, PurchaseRequest, RequestStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoreResult};

/// In-process [`RecordStore`], used when no `DATABASE_URL` is configured.
///
/// `set_unavailable(true)` makes every call fail, to exercise error paths.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    requests: Arc<RwLock<HashMap<String, PurchaseRequest>>>,
    listings: Arc<RwLock<HashMap<String, DatasetListing>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_requests(&self, uploader_address: &str) -> StoreResult<Vec<PurchaseRequest>> {
        self.check_available()?;
        let requests = self.requests.read().await;
        let mut found: Vec<_> = requests
            .values()
            .filter(|r| r.uploader_address == uploader_address)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.requested_at
                .cmp(&a.requested_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(found)
    }

    async fn create_request(&self, request: PurchaseRequest) -> StoreResult<PurchaseRequest> {
        self.check_available()?;
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(StoreError::Rejected(AppError::with_message(
                shared::ErrorCode::AlreadyExists,
                format!("data request {} already exists", request.id),
            )));
        }
        requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn update_request_status(
        &self,
        id: &str,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<PurchaseRequest> {
        self.check_available()?;
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("data request {id}")))?;
        request
            .status
            .ensure_transition(status)
            .map_err(StoreError::Rejected)?;
        request.status = status;
        request.updated_at = Some(now);
        Ok(request.clone())
    }

    async fn create_listing(&self, listing: DatasetListing) -> StoreResult<DatasetListing> {
        self.check_available()?;
        let mut listings = self.listings.write().await;
        if listings.contains_key(&listing.id) {
            return Err(StoreError::Rejected(AppError::with_message(
                shared::ErrorCode::AlreadyExists,
                format!("dataset {} already exists", listing.id),
            )));
        }
        listings.insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    async fn list_listings(&self, category: Option<Category>) -> StoreResult<Vec<DatasetListing>> {
        self.check_available()?;
        let listings = self.listings.read().await;
        let mut found: Vec<_> = listings
            .values()
            .filter(|l| category.is_none_or(|c| l.category == c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn get_listing(&self, id: &str) -> StoreResult<Option<DatasetListing>> {
        self.check_available()?;
        Ok(self.listings.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::models::{NewListing, NewPurchaseRequest, Price, PricePolicy};

    fn new_request(uploader: &str) -> NewPurchaseRequest {
        NewPurchaseRequest {
            dataset_id: "zepto-1".into(),
            dataset_name: "Zepto".into(),
            dataset_description: "Quick commerce".into(),
            cid: "QmZepto".into(),
            requester_address: "0xbuyer".into(),
            uploader_address: uploader.into(),
            category: "Groceries and Food".into(),
            size: "1.8 GB".into(),
            price: Price::oyd(1840),
        }
    }

    #[tokio::test]
    async fn test_list_requests_newest_first_and_filtered() {
        let store = MemoryRecordStore::new();
        let t0 = Utc::now();
        store
            .create_request(new_request("0xseller").into_request("req-1".into(), t0))
            .await
            .unwrap();
        store
            .create_request(new_request("0xseller").into_request("req-2".into(), t0 + Duration::seconds(1)))
            .await
            .unwrap();
        store
            .create_request(new_request("0xother").into_request("req-3".into(), t0))
            .await
            .unwrap();

        let listed = store.list_requests("0xseller").await.unwrap();
        let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["req-2", "req-1"]);
    }

    #[tokio::test]
    async fn test_update_status_transitions() {
        let store = MemoryRecordStore::new();
        let now = Utc::now();
        store
            .create_request(new_request("0xseller").into_request("req-1".into(), now))
            .await
            .unwrap();

        let updated = store
            .update_request_status("req-1", RequestStatus::Approved, now)
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Approved);
        assert_eq!(updated.updated_at, Some(now));

        match store
            .update_request_status("req-1", RequestStatus::Pending, now)
            .await
        {
            Err(StoreError::Rejected(err)) => {
                assert_eq!(err.code, shared::ErrorCode::InvalidTransition)
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }

        // Rejected write leaves the row as it was
        let listed = store.list_requests("0xseller").await.unwrap();
        assert_eq!(listed[0].status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_update_missing_request() {
        let store = MemoryRecordStore::new();
        let result = store
            .update_request_status("req-404", RequestStatus::Approved, Utc::now())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryRecordStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_requests("0xseller").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_listings_filter_by_category() {
        let store = MemoryRecordStore::new();
        let listing = NewListing {
            name: "Ledger".into(),
            company: "Acme".into(),
            description: "Transactions".into(),
            category: Category::Finance,
            content_id: "QmLedger".into(),
            size_bytes: 10,
            publisher: "0xacme".into(),
        }
        .into_listing("acme-1".into(), PricePolicy::PerMegabyte, Utc::now());
        store.create_listing(listing.clone()).await.unwrap();

        assert_eq!(store.list_listings(Some(Category::Finance)).await.unwrap().len(), 1);
        assert!(store.list_listings(Some(Category::Research)).await.unwrap().is_empty());
        assert_eq!(store.get_listing("acme-1").await.unwrap(), Some(listing));
    }
}
