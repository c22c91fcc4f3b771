//! Media source implementations and the registry that routes to them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uniscrape_core::config::UpstreamConfig;

use crate::errors::MediaSearchError;
use crate::identifier::ContentIdentifier;
use crate::reference::DetailReference;
use crate::types::{MediaDetail, SearchResult, Source, StreamDescriptor};

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod xprime;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockSource;
pub use xprime::XprimeSource;

/// Capability set of a catalogue source.
///
/// Implementations provide search, details and stream lookup through
/// different backends (a live provider, mock sources for testing).
#[async_trait]
pub trait MediaSource: Send + Sync + std::fmt::Debug {
    /// Which source this implementation serves.
    fn source(&self) -> Source;

    /// Search for movies and shows matching `query`.
    ///
    /// # Errors
    /// - `MediaSearchError::UpstreamStatus` - A lookup returned a non-success status
    /// - `MediaSearchError::UpstreamTimeout` - A lookup timed out
    /// - `MediaSearchError::UpstreamUnreachable` - Network connectivity issues
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MediaSearchError>;

    /// Fetch the season/episode tree of a movie or show.
    ///
    /// # Errors
    /// - `MediaSearchError::UpstreamStatus` - The provider rejected the request
    /// - `MediaSearchError::ParseError` - The payload could not be decoded
    async fn details(&self, reference: &DetailReference) -> Result<MediaDetail, MediaSearchError>;

    /// Resolve playable streams for a movie or episode.
    ///
    /// # Errors
    /// - `MediaSearchError::UpstreamStatus` - The stream backend rejected the request
    /// - `MediaSearchError::UpstreamTimeout` - The stream backend timed out
    async fn streams(
        &self,
        identifier: &ContentIdentifier,
    ) -> Result<Vec<StreamDescriptor>, MediaSearchError>;
}

/// Sources available to the orchestrator, keyed by `Source`.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    sources: HashMap<Source, Arc<dyn MediaSource>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in source configured from `config`.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::ProviderError` - If a source cannot be constructed
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, MediaSearchError> {
        let mut registry = Self::new();
        registry.register(Arc::new(XprimeSource::new(config)?));
        Ok(registry)
    }

    /// Adds or replaces the implementation for its source.
    pub fn register(&mut self, source: Arc<dyn MediaSource>) {
        tracing::debug!(source = %source.source(), "registered media source");
        self.sources.insert(source.source(), source);
    }

    /// Builder-style `register`.
    pub fn with_source(mut self, source: Arc<dyn MediaSource>) -> Self {
        self.register(source);
        self
    }

    /// Looks up the implementation for `source`.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::UnsupportedSource` - If nothing is registered for `source`
    pub fn get(&self, source: Source) -> Result<Arc<dyn MediaSource>, MediaSearchError> {
        self.sources
            .get(&source)
            .cloned()
            .ok_or_else(|| MediaSearchError::UnsupportedSource {
                name: source.to_string(),
            })
    }
}
