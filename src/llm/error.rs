//! Generation error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling the generative model.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response arrived but carried no usable text
    #[error("unusable model response: {0}")]
    InvalidResponse(String),

    /// No response (or no next chunk) within the allowed time
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

impl LLMError {
    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::Request(e) => e.is_timeout() || e.is_connect(),
            LLMError::Api { status, .. } => *status == 429 || *status >= 500,
            LLMError::InvalidResponse(_) => false,
            LLMError::Timeout(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_and_rate_limit_errors_are_retryable() {
        for status in [429, 500, 503] {
            let err = LLMError::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "status {status}");
        }
        assert!(LLMError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = LLMError::Api {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!LLMError::InvalidResponse("empty".to_string()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = LLMError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "api error (status 503): overloaded");
    }
}
