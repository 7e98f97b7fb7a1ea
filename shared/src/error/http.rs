//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::RequestNotFound | Self::DatasetNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::AlreadyExists => StatusCode::CONFLICT,

            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // Gateway-side failures still surface as 500 to callers
            Self::Unknown
            | Self::StorageUnconfigured
            | Self::UploadFailed
            | Self::DecryptionFailed
            | Self::RegistrationFailed
            | Self::PaymentFailed
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::NetworkError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation family)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::InvalidStatus
            | Self::InvalidTransition
            | Self::InvalidCategory
            | Self::InvalidPrice => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_validation_family_is_bad_request() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::RequiredField,
            ErrorCode::InvalidStatus,
            ErrorCode::InvalidTransition,
            ErrorCode::InvalidCategory,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code:?}");
        }
    }

    #[test]
    fn test_method_not_allowed_status() {
        assert_eq!(
            ErrorCode::MethodNotAllowed.http_status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::UploadFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::StorageUnconfigured.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ErrorCode::DatasetNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }
}
