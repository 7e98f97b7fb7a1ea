//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Failure talking to the marketplace gateway
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error body
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(AppError),

    /// Non-success status without a recognizable error body
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Error code reported by the gateway, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(err) => Some(err.code),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure in the upload pipeline
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Off-chain storage rejected the upload
    #[error("Failed to upload dataset: {0}")]
    Storage(#[source] ClientError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// `retry_registration` outside a failed registration
    #[error("No failed registration to retry")]
    NothingToRetry,

    /// `confirm` without a submitted transaction
    #[error("No registration transaction to confirm")]
    NothingToConfirm,
}

/// Failure registering a dataset on-chain
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction failed: {0}")]
    Failed(String),
}

/// Failure paying for a listing
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("No exchange rate from {from} to {to}")]
    MissingRate { from: String, to: String },

    #[error("Payment rejected: {0}")]
    Rejected(String),

    #[error("Payment failed: {0}")]
    Failed(String),
}

/// Failure granting access after payment
#[derive(Debug, Clone, Error)]
#[error("Access grant failed: {0}")]
pub struct AccessError(pub String);

/// Failure previewing decrypted content
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("Please connect your wallet first")]
    NoWallet,

    #[error("Signature request rejected: {0}")]
    SigningRejected(String),

    #[error("Failed to fetch decryption key: {0}")]
    KeyFetch(String),

    #[error("Failed to decrypt file: {0}")]
    Decrypt(String),

    #[error("Failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure in the purchase pipeline
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("Dataset {0} already purchased")]
    AlreadyPurchased(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Creating a purchase request through the gateway failed
    #[error(transparent)]
    Request(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_exposes_code() {
        let err = ClientError::Api(AppError::new(ErrorCode::InvalidTransition));
        assert_eq!(err.code(), Some(ErrorCode::InvalidTransition));
        assert!(err.to_string().starts_with("API error 1003"));

        let err = ClientError::InvalidResponse("empty".into());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_registration_error_is_transparent_in_upload() {
        let err: UploadError = RegistrationError::Rejected("user denied".into()).into();
        assert_eq!(err.to_string(), "Transaction rejected: user denied");
    }
}
