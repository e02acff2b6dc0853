//! Crate-level error type returned by every store operation.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors surfaced by the session, cart and favorites stores.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The caller broke a precondition; nothing was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Whether this failure ended the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Storage(_) => "Could not save your session on this device".to_string(),
            Self::InvalidInput(message) => message.clone(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_is_transparent() {
        let err = ClientError::from(ApiError::Rejected {
            status: 400,
            message: "Username already taken".to_string(),
        });
        assert_eq!(err.to_string(), "Username already taken");
        assert_eq!(err.user_message(), "Username already taken");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_passthrough() {
        let err = ClientError::from(ApiError::Unauthorized {
            message: "expired".to_string(),
        });
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_invalid_input_message() {
        let err = ClientError::InvalidInput("Username is required".to_string());
        assert_eq!(err.user_message(), "Username is required");
    }
}
