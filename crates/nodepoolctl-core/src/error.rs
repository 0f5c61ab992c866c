//! Unified error handling for nodepoolctl-core
//!
//! Every fallible core operation returns [`CoreError`]. Remote failures are
//! wrapped as [`CoreError::Transport`]; the other variants are produced by
//! the core itself.
//!
//! # Example
//!
//! ```rust
//! use nodepoolctl_core::{ApiError, CoreError};
//!
//! let err: CoreError = ApiError::service(404, "NotFound", "no such pool").into();
//! assert!(err.is_not_found());
//! assert!(!err.is_retryable());
//! ```

use crate::api::{ActionType, ApiError, WorkRequestStatus};
use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Network or remote service failure, surfaced as-is
    #[error("API error: {0}")]
    Transport(#[from] ApiError),

    /// No terminal status was reached within the wait budget
    #[error("Operation timed out after {0:?}")]
    OperationTimedOut(Duration),

    /// The remote service reported a terminal failure
    #[error("Operation {status}: {detail}")]
    OperationFailed {
        status: WorkRequestStatus,
        detail: String,
    },

    /// A completed work request lists no matching resource
    #[error("No {entity_type} resource with action {action} in work request")]
    ResourceNotCorrelated {
        action: ActionType,
        entity_type: String,
    },

    /// A list endpoint handed back a cursor it had already returned
    #[error("Pagination cycle detected: cursor '{cursor}' was returned twice")]
    PaginationCycleDetected { cursor: String },

    /// Credential blob could not be turned into a client configuration
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Lookup by name found nothing
    #[error("{kind} '{id}' not found")]
    EntityNotFound { kind: String, id: String },

    /// Arguments rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller cancelled the wait
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error, remote (404) or local
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_not_found(),
            CoreError::EntityNotFound { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_unauthorized(),
            CoreError::InvalidCredential(_) => true,
            _ => false,
        }
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_timeout(),
            CoreError::OperationTimedOut(_) => true,
            _ => false,
        }
    }

    /// Returns true for the structured "no matching resource" outcome
    #[must_use]
    pub fn is_not_correlated(&self) -> bool {
        matches!(self, CoreError::ResourceNotCorrelated { .. })
    }

    /// Returns true if this is a bad request error (400) or local validation failure
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.status() == Some(400),
            CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable.
    ///
    /// Nothing in the core retries on its own; this is a hint for the caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_retryable(),
            CoreError::OperationTimedOut(_) => true, // Timeout might succeed on retry
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_from_api() {
        let core_err: CoreError = ApiError::service(404, "NotFound", "Node pool not found").into();

        assert!(core_err.is_not_found());
        assert!(!core_err.is_unauthorized());
        assert!(!core_err.is_retryable());
    }

    #[test]
    fn test_core_error_api_helpers_delegate() {
        let core_err: CoreError = ApiError::service(401, "NotAuthenticated", "Bad token").into();
        assert!(core_err.is_unauthorized());

        let core_err: CoreError = ApiError::service(429, "TooManyRequests", "Slow down").into();
        assert!(core_err.is_retryable());

        let core_err: CoreError = ApiError::service(400, "InvalidParameter", "Bad input").into();
        assert!(core_err.is_bad_request());
    }

    #[test]
    fn test_operation_timeout() {
        let err = CoreError::OperationTimedOut(Duration::from_secs(600));
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_operation_failed_display() {
        let err = CoreError::OperationFailed {
            status: WorkRequestStatus::Failed,
            detail: "LimitExceeded: out of capacity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operation FAILED: LimitExceeded: out of capacity"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_correlated_is_distinct() {
        let err = CoreError::ResourceNotCorrelated {
            action: ActionType::Created,
            entity_type: "NODEPOOL".to_string(),
        };
        assert!(err.is_not_correlated());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("NODEPOOL"));
    }

    #[test]
    fn test_pagination_cycle_is_not_transport() {
        let err = CoreError::PaginationCycleDetected {
            cursor: "X".to_string(),
        };
        assert!(!matches!(err, CoreError::Transport(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_entity_not_found() {
        let err = CoreError::EntityNotFound {
            kind: "Node Pool".to_string(),
            id: "workers".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Node Pool 'workers' not found");
    }
}
