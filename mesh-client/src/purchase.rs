//! Purchase pipeline
//!
//! select ─▶ pay ─▶ grant access, plus an independent preview path
//! (challenge ─▶ sign ─▶ key fetch ─▶ decrypt) and the request/approval flow
//! through `POST /data-requests`.

use shared::models::{Currency, DatasetListing, ExchangeRates, Price, PurchaseRequest};
use shared::request::CreateDataRequest;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::client::MarketApi;
use crate::error::{DecryptionError, PaymentError, PurchaseError};
use crate::gateway::{AccessControl, ContractGateway, DecryptionSdk, WalletSigner};

/// External services the pipeline drives
#[derive(Clone)]
pub struct PurchaseServices {
    pub api: Arc<dyn MarketApi>,
    pub contract: Arc<dyn ContractGateway>,
    pub access: Arc<dyn AccessControl>,
    pub wallet: Arc<dyn WalletSigner>,
    pub sdk: Arc<dyn DecryptionSdk>,
}

/// Outcome of a paid purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub dataset_id: String,
    pub tx_hash: String,
    /// Amount actually paid, in the chosen currency
    pub price: Price,
    /// Access token; `None` when the grant failed after payment
    pub access: Option<String>,
}

/// Transient success message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// Decrypted content in a temporary file, deleted on drop
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
    len: usize,
}

impl PreviewHandle {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.file.path()).await
    }
}

pub struct PurchasePipeline {
    services: PurchaseServices,
    rates: ExchangeRates,
    purchased: HashSet<String>,
    notice: Arc<watch::Sender<Option<Notice>>>,
    notice_ttl: Duration,
    dismiss: Option<CancellationToken>,
}

impl PurchasePipeline {
    pub fn new(services: PurchaseServices, rates: ExchangeRates, notice_ttl: Duration) -> Self {
        let (notice, _) = watch::channel(None);
        Self {
            services,
            rates,
            purchased: HashSet::new(),
            notice: Arc::new(notice),
            notice_ttl,
            dismiss: None,
        }
    }

    pub fn is_purchased(&self, dataset_id: &str) -> bool {
        self.purchased.contains(dataset_id)
    }

    pub fn can_purchase(&self, listing: &DatasetListing) -> bool {
        !self.is_purchased(&listing.id)
    }

    /// The success notice, `None` once dismissed or expired
    pub fn notices(&self) -> watch::Receiver<Option<Notice>> {
        self.notice.subscribe()
    }

    /// Price of `listing` in `currency`
    pub fn quote(&self, listing: &DatasetListing, currency: Currency) -> Result<Price, PaymentError> {
        self.rates
            .convert(&listing.price, currency)
            .ok_or_else(|| PaymentError::MissingRate {
                from: listing.price.unit.to_string(),
                to: currency.to_string(),
            })
    }

    /// Pay for `listing` in `currency`, then grant access to its content.
    ///
    /// Once payment succeeds the listing stays purchased; a failed grant is
    /// reported on the receipt instead of undoing the payment.
    pub async fn buy(
        &mut self,
        listing: &DatasetListing,
        currency: Currency,
    ) -> Result<Receipt, PurchaseError> {
        if self.is_purchased(&listing.id) {
            return Err(PurchaseError::AlreadyPurchased(listing.id.clone()));
        }
        let price = self.quote(listing, currency)?;

        let tx_hash = self
            .services
            .contract
            .buy_dataset(&listing.id, &price)
            .await
            .inspect_err(|e| tracing::warn!(dataset_id = %listing.id, error = %e, "Payment failed"))?;
        self.purchased.insert(listing.id.clone());
        tracing::info!(dataset_id = %listing.id, %price, %tx_hash, "Dataset purchased");

        let access = match self
            .services
            .access
            .grant_access(&listing.id, &listing.content_id)
            .await
        {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::error!(dataset_id = %listing.id, error = %e, "Access grant failed after payment");
                None
            }
        };

        self.show_notice(Notice {
            title: "Purchase Successful!".into(),
            message: format!("{} is now available", listing.name),
        });

        Ok(Receipt {
            dataset_id: listing.id.clone(),
            tx_hash,
            price,
            access,
        })
    }

    fn show_notice(&mut self, notice: Notice) {
        self.dismiss_notice();
        self.notice.send_replace(Some(notice));

        let token = CancellationToken::new();
        let sender = self.notice.clone();
        let ttl = self.notice_ttl;
        let child = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    sender.send_replace(None);
                }
            }
        });
        self.dismiss = Some(token);
    }

    /// Hide the notice now and stop its timer
    pub fn dismiss_notice(&mut self) {
        if let Some(token) = self.dismiss.take() {
            token.cancel();
        }
        self.notice.send_replace(None);
    }

    /// Decrypt the content of `listing` into a temporary file.
    ///
    /// Purchase state is never touched, whatever the outcome.
    pub async fn preview(&self, listing: &DatasetListing) -> Result<PreviewHandle, DecryptionError> {
        let wallet = &self.services.wallet;
        let sdk = &self.services.sdk;

        let address = wallet.address().ok_or(DecryptionError::NoWallet)?;
        let challenge = sdk.auth_challenge(&address).await?;
        let signature = wallet.sign_message(&challenge).await?;
        let key = sdk
            .fetch_key(&listing.content_id, &address, &signature)
            .await?;
        let plaintext = sdk.decrypt(&listing.content_id, &key).await?;

        let mut file = tempfile::Builder::new().prefix("preview-").tempfile()?;
        file.write_all(&plaintext)?;
        file.flush()?;
        tracing::debug!(dataset_id = %listing.id, bytes = plaintext.len(), "Preview decrypted");

        Ok(PreviewHandle {
            file,
            len: plaintext.len(),
        })
    }

    /// Ask the publisher of `listing` for access.
    pub async fn request_dataset(
        &self,
        listing: &DatasetListing,
        requester_address: &str,
    ) -> Result<PurchaseRequest, PurchaseError> {
        let price = self.quote(listing, Currency::Oyd)?;
        let body = CreateDataRequest {
            dataset_id: listing.id.clone(),
            dataset_name: listing.name.clone(),
            dataset_description: listing.description.clone(),
            cid: listing.content_id.clone(),
            requester_address: requester_address.to_string(),
            uploader_address: listing.publisher.clone(),
            category: listing.category.label().to_string(),
            size: listing.size.clone(),
            oyd_cost: price.amount,
        };
        let request = self.services.api.create_request(&body).await?;
        tracing::info!(id = %request.id, dataset_id = %listing.id, "Purchase request created");
        Ok(request)
    }
}

impl Drop for PurchasePipeline {
    fn drop(&mut self) {
        if let Some(token) = self.dismiss.take() {
            token.cancel();
        }
    }
}
