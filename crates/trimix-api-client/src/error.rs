//! API client error types.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Backend returned {status}: {detail}")]
    Status {
        status: u16,
        /// Server-supplied detail message, or a generic placeholder.
        detail: String,
    },

    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Server-supplied detail message, when one was decoded from the
    /// response body. Callers translate this for the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_extraction() {
        let err = ApiError::Status {
            status: 422,
            detail: "Invalid source URL".into(),
        };
        assert_eq!(err.detail(), Some("Invalid source URL"));
        assert!(!err.is_retryable());

        let err = ApiError::Status {
            status: 503,
            detail: String::new(),
        };
        assert_eq!(err.detail(), None);
        assert!(err.is_retryable());
    }
}
