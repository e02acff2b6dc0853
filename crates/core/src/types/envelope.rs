//! The `{ success, message?, data }` wrapper present on every API response.

use serde::{Deserialize, Serialize};

/// Response envelope returned by every endpoint.
///
/// Error responses carry `success: false`, a human-readable `message` and no
/// `data`, so `data` is optional even for endpoints that always return one
/// on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the server considers the call successful.
    pub success: bool,
    /// Server-supplied message, mostly present on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Build a successful envelope around `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Build a failed envelope with a message and no data.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
