//! In-memory collaborators
//!
//! Each fake records what it was asked to do and can be switched into a
//! failing mode, so pipelines can be driven through every branch without a
//! chain, a wallet or a running gateway.

use async_trait::async_trait;
use chrono::Utc;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, DatasetListing, NewPurchaseRequest, Price, PurchaseRequest, RequestStatus,
};
use shared::request::{CreateDataRequest, SaveDatasetRequest, UploadRequest};
use shared::response::{SaveDatasetResponse, UploadResponse};
use shared::util::IdGenerator;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::client::MarketApi;
use crate::error::{
    AccessError, ClientError, ClientResult, DecryptionError, PaymentError, RegistrationError,
};
use crate::gateway::{
    AccessControl, ContractGateway, DatasetRegistration, DecryptionSdk, WalletSigner,
};

fn switch(flag: &AtomicBool, on: bool) {
    flag.store(on, Ordering::SeqCst);
}

fn is_on(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

// ========== Gateway ==========

/// [`MarketApi`] that keeps everything in memory
#[derive(Clone, Default)]
pub struct FakeMarketApi {
    uploads: Arc<Mutex<Vec<UploadRequest>>>,
    requests: Arc<Mutex<Vec<PurchaseRequest>>>,
    listings: Arc<Mutex<Vec<DatasetListing>>>,
    ids: Arc<IdGenerator>,
    failing: Arc<AtomicBool>,
}

impl FakeMarketApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a 500-style API error while set
    pub fn set_failing(&self, failing: bool) {
        switch(&self.failing, failing);
    }

    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().await.clone()
    }

    pub async fn requests(&self) -> Vec<PurchaseRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn set_listings(&self, listings: Vec<DatasetListing>) {
        *self.listings.lock().await = listings;
    }

    fn check(&self) -> ClientResult<()> {
        if is_on(&self.failing) {
            return Err(ClientError::Api(AppError::new(ErrorCode::InternalError)));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketApi for FakeMarketApi {
    async fn upload(&self, request: &UploadRequest) -> ClientResult<UploadResponse> {
        self.check()?;
        let metadata = request.metadata.clone().unwrap_or_default();
        let mut uploads = self.uploads.lock().await;
        uploads.push(request.clone());
        let hash = format!("QmFake{}", uploads.len());
        Ok(UploadResponse {
            success: true,
            url: format!("fake://ipfs/{hash}"),
            hash,
            metadata,
            message: "Data uploaded to IPFS successfully".into(),
            listing: None,
        })
    }

    async fn list_requests(&self, uploader_address: &str) -> ClientResult<Vec<PurchaseRequest>> {
        self.check()?;
        let requests = self.requests.lock().await;
        Ok(requests
            .iter()
            .rev()
            .filter(|r| r.uploader_address == uploader_address)
            .cloned()
            .collect())
    }

    async fn create_request(&self, request: &CreateDataRequest) -> ClientResult<PurchaseRequest> {
        self.check()?;
        let new: NewPurchaseRequest = request.clone().into();
        let created = new.into_request(self.ids.request_id(), Utc::now());
        self.requests.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> ClientResult<PurchaseRequest> {
        self.check()?;
        let mut requests = self.requests.lock().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| ClientError::Api(AppError::new(ErrorCode::RequestNotFound)))?;
        request.status.ensure_transition(status).map_err(ClientError::Api)?;
        request.status = status;
        request.updated_at = Some(Utc::now());
        Ok(request.clone())
    }

    async fn list_datasets(&self, category: Option<Category>) -> ClientResult<Vec<DatasetListing>> {
        self.check()?;
        let listings = self.listings.lock().await;
        Ok(listings
            .iter()
            .filter(|l| category.is_none_or(|c| l.category == c))
            .cloned()
            .collect())
    }

    async fn save_dataset(&self, _request: &SaveDatasetRequest) -> ClientResult<SaveDatasetResponse> {
        Err(ClientError::Api(AppError::with_message(
            ErrorCode::InvalidRequest,
            "save_dataset is not faked",
        )))
    }
}

// ========== Wallet ==========

#[derive(Clone, Default)]
pub struct FakeWallet {
    address: Option<String>,
    reject_signing: Arc<AtomicBool>,
}

impl FakeWallet {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn reject_signing(&self, reject: bool) {
        switch(&self.reject_signing, reject);
    }
}

#[async_trait]
impl WalletSigner for FakeWallet {
    fn address(&self) -> Option<String> {
        self.address.clone()
    }

    async fn sign_message(&self, message: &str) -> Result<String, DecryptionError> {
        if is_on(&self.reject_signing) {
            return Err(DecryptionError::SigningRejected("User rejected the request".into()));
        }
        let address = self.address.as_deref().ok_or(DecryptionError::NoWallet)?;
        Ok(format!("signed:{address}:{message}"))
    }
}

// ========== Contract ==========

#[derive(Clone, Default)]
pub struct FakeContract {
    registrations: Arc<Mutex<Vec<DatasetRegistration>>>,
    purchases: Arc<Mutex<Vec<(String, Price)>>>,
    tx_counter: Arc<AtomicU64>,
    fail_registration: Arc<AtomicBool>,
    fail_confirmation: Arc<AtomicBool>,
    fail_payment: Arc<AtomicBool>,
}

impl FakeContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_registration(&self, fail: bool) {
        switch(&self.fail_registration, fail);
    }

    pub fn fail_confirmation(&self, fail: bool) {
        switch(&self.fail_confirmation, fail);
    }

    pub fn fail_payment(&self, fail: bool) {
        switch(&self.fail_payment, fail);
    }

    /// Every registration submitted, including rejected ones
    pub async fn registrations(&self) -> Vec<DatasetRegistration> {
        self.registrations.lock().await.clone()
    }

    /// Successful payments
    pub async fn purchases(&self) -> Vec<(String, Price)> {
        self.purchases.lock().await.clone()
    }

    fn next_tx(&self) -> String {
        format!("0xtx{}", self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl ContractGateway for FakeContract {
    async fn register_dataset(
        &self,
        registration: &DatasetRegistration,
    ) -> Result<String, RegistrationError> {
        self.registrations.lock().await.push(registration.clone());
        if is_on(&self.fail_registration) {
            return Err(RegistrationError::Rejected("execution reverted".into()));
        }
        Ok(self.next_tx())
    }

    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), RegistrationError> {
        if is_on(&self.fail_confirmation) {
            return Err(RegistrationError::Failed(format!("{tx_hash} reverted")));
        }
        Ok(())
    }

    async fn buy_dataset(&self, dataset_id: &str, price: &Price) -> Result<String, PaymentError> {
        if is_on(&self.fail_payment) {
            return Err(PaymentError::Rejected("insufficient funds".into()));
        }
        self.purchases
            .lock()
            .await
            .push((dataset_id.to_string(), *price));
        Ok(self.next_tx())
    }
}

// ========== Access control ==========

#[derive(Clone, Default)]
pub struct FakeAccessControl {
    grants: Arc<Mutex<Vec<(String, String)>>>,
    failing: Arc<AtomicBool>,
}

impl FakeAccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        switch(&self.failing, failing);
    }

    pub async fn grants(&self) -> Vec<(String, String)> {
        self.grants.lock().await.clone()
    }
}

#[async_trait]
impl AccessControl for FakeAccessControl {
    async fn grant_access(&self, dataset_id: &str, content_id: &str) -> Result<String, AccessError> {
        if is_on(&self.failing) {
            return Err(AccessError("access service unavailable".into()));
        }
        self.grants
            .lock()
            .await
            .push((dataset_id.to_string(), content_id.to_string()));
        Ok(format!("access:{dataset_id}:{content_id}"))
    }
}

// ========== Decryption ==========

/// Holds plaintext per content id; the "key" for a cid is `key:<cid>`.
#[derive(Clone, Default)]
pub struct FakeDecryptionSdk {
    contents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_key_fetch: Arc<AtomicBool>,
}

impl FakeDecryptionSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, content_id: &str, plaintext: impl Into<Vec<u8>>) {
        self.contents
            .lock()
            .await
            .insert(content_id.to_string(), plaintext.into());
    }

    pub fn fail_key_fetch(&self, fail: bool) {
        switch(&self.fail_key_fetch, fail);
    }
}

#[async_trait]
impl DecryptionSdk for FakeDecryptionSdk {
    async fn auth_challenge(&self, address: &str) -> Result<String, DecryptionError> {
        Ok(format!("challenge-for-{address}"))
    }

    async fn fetch_key(
        &self,
        content_id: &str,
        address: &str,
        signature: &str,
    ) -> Result<Vec<u8>, DecryptionError> {
        if is_on(&self.fail_key_fetch) {
            return Err(DecryptionError::KeyFetch("access denied".into()));
        }
        if !signature.contains(address) {
            return Err(DecryptionError::KeyFetch("signature mismatch".into()));
        }
        Ok(format!("key:{content_id}").into_bytes())
    }

    async fn decrypt(&self, content_id: &str, key: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        if key != format!("key:{content_id}").as_bytes() {
            return Err(DecryptionError::Decrypt("wrong key".into()));
        }
        self.contents
            .lock()
            .await
            .get(content_id)
            .cloned()
            .ok_or_else(|| DecryptionError::Decrypt(format!("{content_id} not found")))
    }
}
