//! External collaborators of the client pipelines
//!
//! The wallet, the marketplace contract, the access-control service and the
//! storage SDK's key exchange all live outside this crate. Each sits behind
//! a trait here; [`crate::fake`] has in-memory versions.

use async_trait::async_trait;
use shared::models::{Category, Price};

use crate::error::{AccessError, DecryptionError, PaymentError, RegistrationError};

/// What gets written on-chain for an uploaded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRegistration {
    pub content_id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price_eth: Price,
    pub price_usdc: Price,
}

/// Marketplace smart contract
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Submit a registration; returns the transaction hash once accepted.
    async fn register_dataset(
        &self,
        registration: &DatasetRegistration,
    ) -> Result<String, RegistrationError>;

    /// Resolve when the transaction is mined, or fail if it reverts.
    async fn wait_for_confirmation(&self, tx_hash: &str) -> Result<(), RegistrationError>;

    /// Pay for a listing; returns the transaction hash.
    async fn buy_dataset(&self, dataset_id: &str, price: &Price) -> Result<String, PaymentError>;
}

/// Connected wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the connected account, `None` while disconnected
    fn address(&self) -> Option<String>;

    async fn sign_message(&self, message: &str) -> Result<String, DecryptionError>;
}

/// Grants a buyer access to encrypted content
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Returns an access token for `content_id`.
    async fn grant_access(&self, dataset_id: &str, content_id: &str) -> Result<String, AccessError>;
}

/// Key exchange and decryption of stored content
#[async_trait]
pub trait DecryptionSdk: Send + Sync {
    /// Message the wallet must sign to prove ownership of `address`
    async fn auth_challenge(&self, address: &str) -> Result<String, DecryptionError>;

    async fn fetch_key(
        &self,
        content_id: &str,
        address: &str,
        signature: &str,
    ) -> Result<Vec<u8>, DecryptionError>;

    async fn decrypt(&self, content_id: &str, key: &[u8]) -> Result<Vec<u8>, DecryptionError>;
}
