//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 1xxx: Purchase request errors
/// - 2xxx: Dataset errors
/// - 3xxx: Storage errors
/// - 4xxx: Chain errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Purchase request errors (1xxx)
    Request,
    /// Dataset errors (2xxx)
    Dataset,
    /// Off-chain storage errors (3xxx)
    Storage,
    /// Contract gateway errors (4xxx)
    Chain,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Request,
            2000..3000 => Self::Dataset,
            3000..4000 => Self::Storage,
            4000..5000 => Self::Chain,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Request => "request",
            Self::Dataset => "dataset",
            Self::Storage => "storage",
            Self::Chain => "chain",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1003), ErrorCategory::Request);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Dataset);
        assert_eq!(ErrorCategory::from_code(3002), ErrorCategory::Storage);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Chain);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9002), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::RequiredField.category(), ErrorCategory::General);
        assert_eq!(
            ErrorCode::InvalidTransition.category(),
            ErrorCategory::Request
        );
        assert_eq!(ErrorCode::InvalidPrice.category(), ErrorCategory::Dataset);
        assert_eq!(ErrorCode::UploadFailed.category(), ErrorCategory::Storage);
        assert_eq!(ErrorCode::PaymentFailed.category(), ErrorCategory::Chain);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Storage).unwrap();
        assert_eq!(json, "\"storage\"");
        let category: ErrorCategory = serde_json::from_str("\"chain\"").unwrap();
        assert_eq!(category, ErrorCategory::Chain);
    }
}
