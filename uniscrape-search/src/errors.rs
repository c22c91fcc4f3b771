//! Error types for media search functionality.

use thiserror::Error;

use crate::identifier::IdentifierError;

/// Errors that can occur during search, detail and stream lookups.
///
/// Upstream failures are classified into timeout, status and unreachable
/// variants at the fetch layer so callers can map them without inspecting
/// transport errors.
#[derive(Debug, Error)]
pub enum MediaSearchError {
    /// Detail reference carries no numeric provider id.
    #[error("Invalid reference '{reference}': no provider id found")]
    InvalidReference {
        /// The reference as received
        reference: String,
    },

    /// Content identifier could not be decoded.
    #[error(transparent)]
    MalformedIdentifier(#[from] IdentifierError),

    /// No provider is registered for the requested source.
    #[error("Unsupported source: {name}")]
    UnsupportedSource {
        /// The requested source name
        name: String,
    },

    /// Lookup succeeded but produced nothing to return.
    #[error("{reason}")]
    NotFound {
        /// What was missing
        reason: String,
    },

    /// Upstream call exceeded the configured deadline.
    #[error("Upstream request to {url} timed out")]
    UpstreamTimeout {
        /// Requested URL
        url: String,
    },

    /// Upstream answered with a non-success status code.
    #[error("Upstream {url} responded with HTTP {status}")]
    UpstreamStatus {
        /// HTTP status code returned by the provider
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Request was sent but no response arrived.
    #[error("No response from upstream: {reason}")]
    UpstreamUnreachable {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse provider response data.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },

    /// Provider could not be constructed or misbehaved.
    #[error("Provider error: {reason}")]
    ProviderError {
        /// The reason for the provider error
        reason: String,
    },
}

impl MediaSearchError {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaSearchError::InvalidReference { .. }
                | MediaSearchError::MalformedIdentifier(_)
                | MediaSearchError::UnsupportedSource { .. }
        )
    }

    /// Whether the failure originated at a third-party provider.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            MediaSearchError::UpstreamTimeout { .. }
                | MediaSearchError::UpstreamStatus { .. }
                | MediaSearchError::UpstreamUnreachable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let invalid = MediaSearchError::InvalidReference {
            reference: "abc".to_string(),
        };
        assert!(invalid.is_client_error());
        assert!(!invalid.is_upstream_error());

        let status = MediaSearchError::UpstreamStatus {
            status: 500,
            url: "https://api.example.com".to_string(),
        };
        assert!(status.is_upstream_error());
        assert!(!status.is_client_error());
        assert_eq!(
            status.to_string(),
            "Upstream https://api.example.com responded with HTTP 500"
        );
    }
}
