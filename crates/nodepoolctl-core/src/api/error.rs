//! Transport-level errors from the Container Engine API

use thiserror::Error;

/// Failure talking to the remote service
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("{code} ({status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        /// Value of the `opc-request-id` header, for support requests
        request_id: Option<String>,
    },

    /// The request never produced a response (connect, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response was well-formed but missing something we need
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be built from the given settings
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Build a service error without a request id
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Service {
            status,
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    /// HTTP status, when the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true for 404
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true for 401/403
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns true for 409/412
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409 | 412))
    }

    /// Returns true for 429
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns true for 5xx
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if the request timed out on the client side
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Request(e) if e.is_timeout())
    }

    /// Returns true if repeating the same request might succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => self.is_rate_limited() || self.is_server_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = ApiError::service(404, "NotAuthorizedOrNotFound", "no such pool");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());

        let err = ApiError::service(401, "NotAuthenticated", "bad token");
        assert!(err.is_unauthorized());

        let err = ApiError::service(429, "TooManyRequests", "slow down");
        assert!(err.is_rate_limited());
        assert!(err.is_retryable());

        let err = ApiError::service(503, "ServiceUnavailable", "try later");
        assert!(err.is_server_error());
        assert!(err.is_retryable());

        let err = ApiError::service(409, "Conflict", "pool is updating");
        assert!(err.is_conflict());
    }

    #[test]
    fn test_display_includes_code_and_status() {
        let err = ApiError::service(400, "InvalidParameter", "limit must be positive");
        assert_eq!(
            err.to_string(),
            "InvalidParameter (400): limit must be positive"
        );
    }

    #[test]
    fn test_invalid_response_has_no_status() {
        let err = ApiError::InvalidResponse("missing header".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_retryable());
    }
}
