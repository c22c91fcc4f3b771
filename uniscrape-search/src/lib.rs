//! Uniscrape Search - Media search, details and stream lookup

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Turns TMDB-shaped provider responses into a uniform catalogue model,
//! addresses playable content through self-describing identifiers, and
//! memoizes every lookup in a shared TTL cache.

pub mod errors;
pub mod identifier;
pub mod normalizer;
pub mod providers;
pub mod reference;
pub mod service;
pub mod tmdb;
pub mod types;
pub mod upstream;

// Re-export main types
pub use errors::MediaSearchError;
pub use identifier::{ContentIdentifier, IdentifierError};
pub use providers::{MediaSource, ProviderRegistry, XprimeSource};
#[cfg(any(test, feature = "test-utils"))]
pub use providers::MockSource;
pub use reference::DetailReference;
pub use service::{CachedPayload, Fetched, MediaCatalogService};
pub use types::{
    Episode, MediaDetail, MediaKind, SearchResult, Season, Source, StreamDescriptor, Subtitle,
};

/// Convenience type alias for Results with MediaSearchError.
pub type Result<T> = std::result::Result<T, MediaSearchError>;
