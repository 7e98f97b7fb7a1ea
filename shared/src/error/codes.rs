//! Unified error codes for the data marketplace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Purchase request errors
//! - 2xxx: Dataset listing errors
//! - 3xxx: Off-chain storage errors
//! - 4xxx: Chain (contract gateway) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes travel as plain u16 values in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// HTTP method not supported on this route
    MethodNotAllowed = 9,

    // ==================== 1xxx: Purchase requests ====================
    /// Purchase request not found
    RequestNotFound = 1001,
    /// Status string is not a known request status
    InvalidStatus = 1002,
    /// Status change not permitted from the current status
    InvalidTransition = 1003,

    // ==================== 2xxx: Datasets ====================
    /// Dataset listing not found
    DatasetNotFound = 2001,
    /// Unknown dataset category
    InvalidCategory = 2002,
    /// Price could not be parsed
    InvalidPrice = 2003,

    // ==================== 3xxx: Storage ====================
    /// Storage credential is not configured
    StorageUnconfigured = 3001,
    /// Off-chain upload failed
    UploadFailed = 3002,
    /// Content could not be decrypted
    DecryptionFailed = 3003,

    // ==================== 4xxx: Chain ====================
    /// On-chain registration failed
    RegistrationFailed = 4001,
    /// Payment transaction failed
    PaymentFailed = 4002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Network error
    NetworkError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::MethodNotAllowed => "Method not allowed",

            Self::RequestNotFound => "Data request not found",
            Self::InvalidStatus => "Invalid request status",
            Self::InvalidTransition => "Status transition not allowed",

            Self::DatasetNotFound => "Dataset not found",
            Self::InvalidCategory => "Unknown category",
            Self::InvalidPrice => "Invalid price",

            Self::StorageUnconfigured => "Storage credential is not configured",
            Self::UploadFailed => "Failed to upload to IPFS",
            Self::DecryptionFailed => "Failed to decrypt content",

            Self::RegistrationFailed => "Blockchain registration failed",
            Self::PaymentFailed => "Payment failed",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::NetworkError => "Network error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            9 => Self::MethodNotAllowed,

            1001 => Self::RequestNotFound,
            1002 => Self::InvalidStatus,
            1003 => Self::InvalidTransition,

            2001 => Self::DatasetNotFound,
            2002 => Self::InvalidCategory,
            2003 => Self::InvalidPrice,

            3001 => Self::StorageUnconfigured,
            3002 => Self::UploadFailed,
            3003 => Self::DecryptionFailed,

            4001 => Self::RegistrationFailed,
            4002 => Self::PaymentFailed,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,
            9004 => Self::NetworkError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::MethodNotAllowed.code(), 9);
        assert_eq!(ErrorCode::InvalidTransition.code(), 1003);
        assert_eq!(ErrorCode::DatasetNotFound.code(), 2001);
        assert_eq!(ErrorCode::UploadFailed.code(), 3002);
        assert_eq!(ErrorCode::PaymentFailed.code(), 4002);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::DatabaseError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(7), Ok(ErrorCode::RequiredField));
        assert_eq!(ErrorCode::try_from(1002), Ok(ErrorCode::InvalidStatus));
        assert_eq!(ErrorCode::try_from(9003), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(8), Err(InvalidErrorCode(8)));
        assert_eq!(ErrorCode::try_from(5000), Err(InvalidErrorCode(5000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "1003");
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::UploadFailed.to_string(), "3002");
        assert_eq!(
            InvalidErrorCode(77).to_string(),
            "invalid error code: 77"
        );
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::MethodNotAllowed.message(), "Method not allowed");
        assert_eq!(ErrorCode::UploadFailed.message(), "Failed to upload to IPFS");
    }
}
