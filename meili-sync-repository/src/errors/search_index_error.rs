//! Search index error types.
//!
//! This module defines the unified error type for all search service
//! operations, from missing configuration to transport failures and
//! rejected requests.

use thiserror::Error;

/// Unified errors from search service operations.
///
/// Used by the `SearchIndexProvider` trait and everything built on it. Callers
/// decide how to propagate each kind: lifecycle hooks log and discard every
/// variant, while the interactive connection test surfaces them to the user.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Host or admin key is missing. Recoverable: indexing is skipped.
    #[error("Meilisearch host or admin key not configured")]
    NotConfigured,

    /// Both authentication header schemes were rejected.
    #[error("Authentication failed with status {status}: {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// Network level failure (timeout, DNS, connection refused).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The service answered with a status outside the accepted set.
    #[error("Request rejected with status {status}: {body}")]
    RemoteRejection { status: u16, body: String },

    /// Invalid arguments (empty batches, malformed index identifiers).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The interactive connection test failed.
    #[error("Could not connect to Meilisearch server at {host}: {reason}")]
    ConnectionTestFailed { host: String, reason: String },
}

impl SearchIndexError {
    /// Create an authentication error.
    pub fn authentication(status: u16, message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a remote rejection error.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteRejection {
            status,
            body: body.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a connection test error.
    pub fn connection_test(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionTestFailed {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status attached to the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. } | Self::RemoteRejection { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether the error only means the client has no credentials.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}
