//! Upload pipeline
//!
//! ```text
//! idle ─▶ uploading ─▶ uploaded ─▶ registering ─▶ completed
//!   │         │                        │
//!   └─────────┴──────▶ error ◀─────────┘
//!                        │ (content id kept)
//!                        └─▶ retry_registration ─▶ uploaded
//! ```
//!
//! Progress is published through a `watch` channel; observers call
//! [`UploadPipeline::subscribe`].

use serde::Serialize;
use serde_json::Value;
use shared::models::{Category, Currency, Price};
use shared::request::{UploadMetadata, UploadRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use crate::client::MarketApi;
use crate::error::{ClientError, RegistrationError, UploadError};
use crate::gateway::{ContractGateway, DatasetRegistration, WalletSigner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStep {
    #[default]
    Idle,
    Uploading,
    Uploaded,
    Registering,
    Completed,
    Error,
}

/// Observable state of one upload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadStatus {
    pub step: UploadStep,
    pub message: String,
    pub content_id: Option<String>,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
}

impl UploadStatus {
    fn new(step: UploadStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            ..Default::default()
        }
    }

    fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(UploadStep::Error, message)
        }
    }

    fn with_content_id(mut self, content_id: Option<String>) -> Self {
        self.content_id = content_id;
        self
    }

    fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    /// A failed registration whose stored content can be registered again
    pub fn can_retry(&self) -> bool {
        self.step == UploadStep::Error && self.content_id.is_some()
    }
}

/// What the publisher filled in
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<PathBuf>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_eth: String,
    pub price_usdc: String,
    /// Display name for the listing; the wallet address is used when absent
    pub company: Option<String>,
}

impl UploadForm {
    fn metadata(&self) -> UploadMetadata {
        UploadMetadata {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price_eth: self.price_eth.trim().to_string(),
            price_usdc: self.price_usdc.trim().to_string(),
            category: self.category.trim().to_string(),
            company: self.company.clone().filter(|c| !c.trim().is_empty()),
        }
    }
}

/// A form that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub file: PathBuf,
    pub uploader: String,
    pub metadata: UploadMetadata,
    pub category: Category,
    pub price_eth: Price,
    pub price_usdc: Price,
}

impl ValidatedUpload {
    fn registration(&self, content_id: String) -> DatasetRegistration {
        DatasetRegistration {
            content_id,
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            category: self.category,
            price_eth: self.price_eth,
            price_usdc: self.price_usdc,
        }
    }
}

pub struct UploadPipeline {
    api: Arc<dyn MarketApi>,
    contract: Arc<dyn ContractGateway>,
    wallet: Arc<dyn WalletSigner>,
    status: watch::Sender<UploadStatus>,
    /// Registration of the last stored upload, kept for retries
    registration: Option<DatasetRegistration>,
}

impl UploadPipeline {
    pub fn new(
        api: Arc<dyn MarketApi>,
        contract: Arc<dyn ContractGateway>,
        wallet: Arc<dyn WalletSigner>,
    ) -> Self {
        let (status, _) = watch::channel(UploadStatus::default());
        Self {
            api,
            contract,
            wallet,
            status,
            registration: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> UploadStatus {
        self.status.borrow().clone()
    }

    fn publish(&self, status: UploadStatus) {
        tracing::debug!(step = ?status.step, message = %status.message, "Upload status");
        self.status.send_replace(status);
    }

    /// Check the form. On failure the status moves to `error` with a
    /// field-level message and nothing else runs.
    pub fn validate(&self, form: &UploadForm) -> Result<ValidatedUpload, UploadError> {
        self.check(form).map_err(|(message, error)| {
            self.publish(UploadStatus::failed(message, error.clone()));
            UploadError::Validation(error)
        })
    }

    fn check(&self, form: &UploadForm) -> Result<ValidatedUpload, (&'static str, String)> {
        let uploader = self
            .wallet
            .address()
            .ok_or(("Please connect your wallet first", "Wallet not connected".to_string()))?;
        let file = form
            .file
            .clone()
            .ok_or(("Please select a file to upload", "No file selected".to_string()))?;

        let metadata = form.metadata();
        let missing = metadata.missing_fields();
        if !missing.is_empty() {
            return Err((
                "Please fill in all required fields",
                format!("Missing fields: {}", missing.join(", ")),
            ));
        }

        let category: Category = metadata
            .category
            .parse()
            .map_err(|e: shared::AppError| ("Please choose a valid category", e.message))?;
        let price_eth = Price::parse(Currency::Eth, &metadata.price_eth)
            .map_err(|e| ("Please enter a valid ETH price", e.message))?;
        let price_usdc = Price::parse(Currency::Usdc, &metadata.price_usdc)
            .map_err(|e| ("Please enter a valid USDC price", e.message))?;

        Ok(ValidatedUpload {
            file,
            uploader,
            metadata,
            category,
            price_eth,
            price_usdc,
        })
    }

    /// Validate, store off-chain, then submit the on-chain registration.
    ///
    /// Returns the registration transaction hash; [`Self::confirm`] waits for it.
    pub async fn submit(&mut self, form: &UploadForm) -> Result<String, UploadError> {
        let upload = self.validate(form)?;
        self.registration = None;

        self.publish(UploadStatus::new(
            UploadStep::Uploading,
            "Uploading dataset to IPFS...",
        ));

        let data = match read_payload(&upload.file).await {
            Ok(data) => data,
            Err(e) => {
                self.publish(UploadStatus::failed("Failed to upload dataset", e.to_string()));
                return Err(e);
            }
        };

        let request = UploadRequest {
            data: Some(data),
            metadata: Some(upload.metadata.clone()),
            uploader_address: Some(upload.uploader.clone()),
        };
        let stored = match self.api.upload(&request).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, name = %upload.metadata.name, "Off-chain upload failed");
                self.publish(UploadStatus::failed("Failed to upload dataset", describe(&e)));
                return Err(UploadError::Storage(e));
            }
        };

        tracing::info!(content_id = %stored.hash, name = %upload.metadata.name, "Dataset stored off-chain");
        self.publish(
            UploadStatus::new(
                UploadStep::Uploaded,
                "File uploaded to IPFS successfully. Registering on blockchain...",
            )
            .with_content_id(Some(stored.hash.clone())),
        );

        self.registration = Some(upload.registration(stored.hash));
        self.register().await
    }

    async fn register(&mut self) -> Result<String, UploadError> {
        let registration = self.registration.clone().ok_or(UploadError::NothingToRetry)?;
        let content_id = Some(registration.content_id.clone());

        match self.contract.register_dataset(&registration).await {
            Ok(tx_hash) => {
                tracing::info!(content_id = %registration.content_id, %tx_hash, "Registration submitted");
                self.publish(
                    UploadStatus::new(
                        UploadStep::Registering,
                        "Transaction submitted. Waiting for confirmation...",
                    )
                    .with_content_id(content_id)
                    .with_tx_hash(tx_hash.clone()),
                );
                Ok(tx_hash)
            }
            Err(e) => Err(self.registration_failed(e, content_id)),
        }
    }

    fn registration_failed(&self, e: RegistrationError, content_id: Option<String>) -> UploadError {
        tracing::warn!(error = %e, content_id = ?content_id, "Blockchain registration failed");
        self.publish(
            UploadStatus::failed("Blockchain registration failed", e.to_string())
                .with_content_id(content_id),
        );
        e.into()
    }

    /// Wait for the submitted registration to be mined.
    pub async fn confirm(&mut self) -> Result<(), UploadError> {
        let current = self.status();
        let (UploadStep::Registering, Some(tx_hash)) = (current.step, current.tx_hash.clone())
        else {
            return Err(UploadError::NothingToConfirm);
        };

        match self.contract.wait_for_confirmation(&tx_hash).await {
            Ok(()) => {
                tracing::info!(%tx_hash, content_id = ?current.content_id, "Registration confirmed");
                self.publish(
                    UploadStatus::new(
                        UploadStep::Completed,
                        "Dataset successfully uploaded and registered on blockchain!",
                    )
                    .with_content_id(current.content_id)
                    .with_tx_hash(tx_hash),
                );
                Ok(())
            }
            Err(e) => Err(self.registration_failed(e, current.content_id)),
        }
    }

    /// Resubmit the registration of already-stored content. Storage is not
    /// contacted again.
    pub async fn retry_registration(&mut self) -> Result<String, UploadError> {
        let current = self.status();
        if !current.can_retry() || self.registration.is_none() {
            return Err(UploadError::NothingToRetry);
        }

        // Back to stored-but-unregistered until the contract accepts the transaction
        self.publish(
            UploadStatus::new(UploadStep::Uploaded, "Retrying blockchain registration...")
                .with_content_id(current.content_id),
        );
        self.register().await
    }

    /// Submit then confirm; returns the final status.
    pub async fn run(&mut self, form: &UploadForm) -> Result<UploadStatus, UploadError> {
        self.submit(form).await?;
        self.confirm().await?;
        Ok(self.status())
    }
}

/// Read the file; JSON is sent as-is, anything else as `{"content": text}`.
/// Bytes that are not UTF-8 are decoded lossily.
async fn read_payload(path: &Path) -> Result<Value, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "content": text })))
}

fn describe(err: &ClientError) -> String {
    match err {
        ClientError::Api(app) => app.message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::fake::{FakeContract, FakeMarketApi, FakeWallet};
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    /// Contract that records the pipeline status at each call it receives
    #[derive(Default)]
    struct ObservedContract {
        inner: Arc<FakeContract>,
        pipeline: OnceLock<watch::Receiver<UploadStatus>>,
        seen: Mutex<Vec<(&'static str, UploadStatus)>>,
    }

    impl ObservedContract {
        fn wrap(inner: Arc<FakeContract>) -> Arc<Self> {
            Arc::new(Self {
                inner,
                ..Default::default()
            })
        }

        fn record(&self, call: &'static str) {
            if let Some(rx) = self.pipeline.get() {
                self.seen.lock().unwrap().push((call, rx.borrow().clone()));
            }
        }

        fn seen(&self) -> Vec<(&'static str, UploadStatus)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContractGateway for ObservedContract {
        async fn register_dataset(
            &self,
            registration: &DatasetRegistration,
        ) -> Result<String, RegistrationError> {
            self.record("register");
            self.inner.register_dataset(registration).await
        }

        async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), RegistrationError> {
            self.record("confirm");
            self.inner.wait_for_confirmation(tx_hash).await
        }

        async fn buy_dataset(&self, dataset_id: &str, price: &Price) -> Result<String, PaymentError> {
            self.inner.buy_dataset(dataset_id, price).await
        }
    }

    fn observed_fixture(contents: &[u8]) -> (Fixture, Arc<ObservedContract>) {
        let mut observed = None;
        let f = fixture_with(FakeWallet::connected("0xpub"), contents, |fake| {
            let contract = ObservedContract::wrap(fake);
            observed = Some(contract.clone());
            contract as Arc<dyn ContractGateway>
        });
        let observed = observed.unwrap();
        observed.pipeline.set(f.pipeline.subscribe()).unwrap();
        (f, observed)
    }

    struct Fixture {
        api: Arc<FakeMarketApi>,
        contract: Arc<FakeContract>,
        pipeline: UploadPipeline,
        _dir: tempfile::TempDir,
        form: UploadForm,
    }

    fn fixture(wallet: FakeWallet, contents: &str) -> Fixture {
        fixture_with(wallet, contents.as_bytes(), |contract| {
            contract as Arc<dyn ContractGateway>
        })
    }

    /// `contract_for` picks the gateway the pipeline talks to, given the fake
    fn fixture_with(
        wallet: FakeWallet,
        contents: &[u8],
        contract_for: impl FnOnce(Arc<FakeContract>) -> Arc<dyn ContractGateway>,
    ) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rainfall.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents)
            .unwrap();

        let api = Arc::new(FakeMarketApi::new());
        let contract = Arc::new(FakeContract::new());
        let pipeline =
            UploadPipeline::new(api.clone(), contract_for(contract.clone()), Arc::new(wallet));
        let form = UploadForm {
            file: Some(path),
            name: "Rainfall 2024".into(),
            description: "Daily rainfall".into(),
            category: "Environmental".into(),
            price_eth: "0.1".into(),
            price_usdc: "10".into(),
            company: None,
        };
        Fixture {
            api,
            contract,
            pipeline,
            _dir: dir,
            form,
        }
    }

    #[tokio::test]
    async fn test_run_completes() {
        let mut f = fixture(FakeWallet::connected("0xpub"), r#"{"rows":[1,2]}"#);
        let status = f.pipeline.run(&f.form).await.unwrap();

        assert_eq!(status.step, UploadStep::Completed);
        assert_eq!(
            status.message,
            "Dataset successfully uploaded and registered on blockchain!"
        );
        let cid = status.content_id.unwrap();
        assert_eq!(f.contract.registrations().await[0].content_id, cid);

        let uploads = f.api.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].data, Some(serde_json::json!({"rows": [1, 2]})));
        assert_eq!(uploads[0].uploader_address.as_deref(), Some("0xpub"));
    }

    #[tokio::test]
    async fn test_non_json_file_is_wrapped() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "date,mm\n2024-01-01,3");
        f.pipeline.submit(&f.form).await.unwrap();
        assert_eq!(
            f.api.uploads().await[0].data,
            Some(serde_json::json!({"content": "date,mm\n2024-01-01,3"}))
        );
    }

    #[tokio::test]
    async fn test_validation_failures_stop_pipeline() {
        let mut f = fixture(FakeWallet::disconnected(), "{}");
        assert!(matches!(
            f.pipeline.submit(&f.form).await,
            Err(UploadError::Validation(_))
        ));
        let status = f.pipeline.status();
        assert_eq!(status.step, UploadStep::Error);
        assert_eq!(status.message, "Please connect your wallet first");
        assert_eq!(status.error.as_deref(), Some("Wallet not connected"));

        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        f.form.file = None;
        assert!(f.pipeline.submit(&f.form).await.is_err());
        assert_eq!(f.pipeline.status().message, "Please select a file to upload");

        f.form.file = Some("unused".into());
        f.form.price_usdc = "  ".into();
        assert!(f.pipeline.submit(&f.form).await.is_err());
        assert_eq!(
            f.pipeline.status().error.as_deref(),
            Some("Missing fields: priceUSDC")
        );

        f.form.price_usdc = "-1".into();
        assert!(f.pipeline.submit(&f.form).await.is_err());

        assert!(f.api.uploads().await.is_empty());
        assert!(f.contract.registrations().await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_skips_registration() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        f.api.set_failing(true);

        match f.pipeline.submit(&f.form).await {
            Err(UploadError::Storage(_)) => {}
            other => panic!("Expected Storage error, got {other:?}"),
        }
        let status = f.pipeline.status();
        assert_eq!(status.step, UploadStep::Error);
        assert_eq!(status.message, "Failed to upload dataset");
        assert!(status.content_id.is_none());
        assert!(!status.can_retry());
        assert!(f.contract.registrations().await.is_empty());
        assert!(matches!(
            f.pipeline.retry_registration().await,
            Err(UploadError::NothingToRetry)
        ));
    }

    #[tokio::test]
    async fn test_retry_reuses_content_id() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        f.contract.fail_registration(true);

        assert!(matches!(
            f.pipeline.submit(&f.form).await,
            Err(UploadError::Registration(_))
        ));
        let failed = f.pipeline.status();
        assert_eq!(failed.message, "Blockchain registration failed");
        assert!(failed.can_retry());
        let cid = failed.content_id.clone().unwrap();

        f.contract.fail_registration(false);
        f.pipeline.retry_registration().await.unwrap();
        f.pipeline.confirm().await.unwrap();

        assert_eq!(f.pipeline.status().step, UploadStep::Completed);
        assert_eq!(f.api.uploads().await.len(), 1);
        let registrations = f.contract.registrations().await;
        assert_eq!(registrations.len(), 2);
        assert!(registrations.iter().all(|r| r.content_id == cid));
    }

    #[tokio::test]
    async fn test_confirmation_failure_keeps_content_id() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        f.contract.fail_confirmation(true);

        assert!(f.pipeline.run(&f.form).await.is_err());
        let status = f.pipeline.status();
        assert_eq!(status.step, UploadStep::Error);
        assert!(status.can_retry());
    }

    #[tokio::test]
    async fn test_confirm_without_submission() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        assert!(matches!(
            f.pipeline.confirm().await,
            Err(UploadError::NothingToConfirm)
        ));
    }

    #[tokio::test]
    async fn test_observers_see_progress() {
        let mut f = fixture(FakeWallet::connected("0xpub"), "{}");
        let rx = f.pipeline.subscribe();
        f.pipeline.submit(&f.form).await.unwrap();
        assert_eq!(rx.borrow().step, UploadStep::Registering);
        assert!(rx.borrow().tx_hash.is_some());
    }

    #[tokio::test]
    async fn test_stored_before_registration_and_completed_after_confirmation() {
        let (mut f, observed) = observed_fixture(br#"{"a":1}"#);
        f.form.name = "Test".into();
        f.form.category = "Finance".into();
        f.form.price_eth = "0.1".into();
        f.form.price_usdc = "100".into();

        let status = f.pipeline.run(&f.form).await.unwrap();
        assert_eq!(status.step, UploadStep::Completed);

        let seen = observed.seen();
        assert_eq!(seen.len(), 2);
        let (call, at_register) = &seen[0];
        assert_eq!(*call, "register");
        assert_eq!(at_register.step, UploadStep::Uploaded);
        assert!(at_register.content_id.as_deref().is_some_and(|cid| !cid.is_empty()));
        assert!(at_register.tx_hash.is_none());

        let (call, at_confirm) = &seen[1];
        assert_eq!(*call, "confirm");
        assert_eq!(at_confirm.step, UploadStep::Registering);
        assert!(at_confirm.tx_hash.is_some());
        assert_eq!(at_confirm.content_id, at_register.content_id);

        assert_eq!(f.api.uploads().await[0].data, Some(serde_json::json!({"a": 1})));
        assert_eq!(f.contract.registrations().await[0].category, Category::Finance);
    }

    #[tokio::test]
    async fn test_retry_waits_for_accepted_transaction() {
        let (mut f, observed) = observed_fixture(b"{}");
        f.contract.fail_registration(true);
        assert!(f.pipeline.submit(&f.form).await.is_err());

        f.contract.fail_registration(false);
        let tx_hash = f.pipeline.retry_registration().await.unwrap();

        let seen = observed.seen();
        assert_eq!(seen.len(), 2);
        let (_, at_retry) = &seen[1];
        assert_eq!(at_retry.step, UploadStep::Uploaded);
        assert_eq!(at_retry.message, "Retrying blockchain registration...");
        assert_eq!(at_retry.content_id, seen[0].1.content_id);
        assert!(at_retry.tx_hash.is_none());

        let status = f.pipeline.status();
        assert_eq!(status.step, UploadStep::Registering);
        assert_eq!(status.tx_hash, Some(tx_hash));
    }

    #[tokio::test]
    async fn test_non_utf8_file_is_decoded_lossily() {
        let mut f = fixture_with(
            FakeWallet::connected("0xpub"),
            b"name\ncaf\xe9\n",
            |contract| contract as Arc<dyn ContractGateway>,
        );
        f.pipeline.submit(&f.form).await.unwrap();

        assert_eq!(
            f.api.uploads().await[0].data,
            Some(serde_json::json!({"content": "name\ncaf\u{FFFD}\n"}))
        );
        assert_eq!(f.contract.registrations().await.len(), 1);
    }
}
