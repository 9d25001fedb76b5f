//! Error types for the tripsnap client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when the transport itself failed (no HTTP status at all).
pub const NETWORK_ERROR_MESSAGE: &str = "Could not reach the server. Please try again.";

/// A shared error type for the entire tripsnap client.
///
/// Variants follow the failure classes the stores care about: validation
/// caught before any request, expected absence (401/403), server-reported
/// errors carrying a human-readable message, and transport failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TripsnapError {
    /// Input rejected client-side; no request was issued
    #[error("{0}")]
    Validation(String),

    /// 401/403 from an identity or visibility check
    #[error("Not authorized (status {status})")]
    Unauthorized { status: u16 },

    /// Non-2xx response; `message` is taken from the response body when present
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl TripsnapError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a client-side validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a 401/403 "not logged in / not allowed" condition
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if this is a transport failure
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing inline next to a form.
    ///
    /// Server-reported and validation messages are surfaced verbatim;
    /// transport failures become a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Api { message, .. } => message.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Unauthorized { .. } => "Please log in first.".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TripsnapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TripsnapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TripsnapError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TripsnapError>`.
pub type Result<T> = std::result::Result<T, TripsnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = TripsnapError::network("tcp connect error: Connection refused");
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert!(err.is_network());
    }

    #[test]
    fn test_user_message_surfaces_server_text() {
        let err = TripsnapError::api(400, "Title is required.");
        assert_eq!(err.user_message(), "Title is required.");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_unauthorized_status() {
        let err = TripsnapError::Unauthorized { status: 403 };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: TripsnapError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TripsnapError::Serialization { ref format, .. } if format == "JSON"));
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: TripsnapError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png").into();
        assert!(matches!(err, TripsnapError::Io { ref message } if message.contains("NotFound")));
        assert_eq!(err.status(), None);
    }
}
