use thiserror::Error;

use super::common::ApiErrorDetails;
use crate::error::ErrorKind;

/// `error_id` the traffic manager uses for a missing object
pub const NOT_FOUND_ERROR_ID: &str = "resource.not_found";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP 404 or an error body carrying `resource.not_found` is NotFound;
    /// everything else is a remote call failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ApiError { status: 404, .. } => ErrorKind::NotFound,
            ApiError::ApiError {
                details: Some(details),
                ..
            } if details.error_id == NOT_FOUND_ERROR_ID => ErrorKind::NotFound,
            _ => ErrorKind::RemoteCall,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, error_id: Option<&str>) -> ApiError {
        ApiError::ApiError {
            status,
            message: "boom".to_string(),
            details: error_id.map(|id| {
                Box::new(ApiErrorDetails {
                    error_id: id.to_string(),
                    error_text: "boom".to_string(),
                })
            }),
        }
    }

    #[test]
    fn not_found_by_status_or_error_id() {
        assert_eq!(api_error(404, None).kind(), ErrorKind::NotFound);
        assert_eq!(
            api_error(400, Some(NOT_FOUND_ERROR_ID)).kind(),
            ErrorKind::NotFound
        );
        assert!(api_error(404, Some("other")).is_not_found());
    }

    #[test]
    fn other_failures_are_remote_call_errors() {
        assert_eq!(api_error(500, None).kind(), ErrorKind::RemoteCall);
        assert_eq!(
            api_error(400, Some("config.invalid")).kind(),
            ErrorKind::RemoteCall
        );
        assert_eq!(ApiError::AuthError.kind(), ErrorKind::RemoteCall);
        assert_eq!(
            ApiError::ParseError("bad json".into()).kind(),
            ErrorKind::RemoteCall
        );
    }
}
