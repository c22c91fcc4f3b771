//! Cache-first orchestration of search, details and stream lookups.

use std::sync::Arc;

use uniscrape_core::{CacheNamespace, TtlCache, UniscrapeConfig};

use crate::errors::MediaSearchError;
use crate::identifier::ContentIdentifier;
use crate::providers::ProviderRegistry;
use crate::reference::DetailReference;
use crate::types::{MediaDetail, SearchResult, Source, StreamDescriptor};

/// Value stored in the shared response cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    /// Search results
    Search(Vec<SearchResult>),
    /// Detail tree
    Details(MediaDetail),
    /// Resolved streams
    Streams(Vec<StreamDescriptor>),
}

/// Lookup result tagged with whether it came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// The looked-up value
    pub value: T,
    /// True when served from the cache without contacting a provider
    pub cached: bool,
}

impl<T> Fetched<T> {
    fn fresh(value: T) -> Self {
        Self {
            value,
            cached: false,
        }
    }

    fn hit(value: T) -> Self {
        Self {
            value,
            cached: true,
        }
    }
}

/// Media catalogue service routing requests to sources through the cache.
///
/// Every successful non-empty lookup is stored under
/// `{namespace}:{source}_{canonical id}`; repeated requests within the TTL
/// never reach the provider.
#[derive(Debug, Clone)]
pub struct MediaCatalogService {
    registry: Arc<ProviderRegistry>,
    cache: Arc<TtlCache<CachedPayload>>,
}

impl MediaCatalogService {
    /// Creates a service over `registry` sharing `cache`.
    pub fn new(registry: ProviderRegistry, cache: Arc<TtlCache<CachedPayload>>) -> Self {
        Self {
            registry: Arc::new(registry),
            cache,
        }
    }

    /// Creates a service with the built-in sources and a cache using the
    /// configured TTL.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::ProviderError` - If a source cannot be constructed
    pub fn from_config(config: &UniscrapeConfig) -> Result<Self, MediaSearchError> {
        let registry = ProviderRegistry::from_config(&config.upstream)?;
        let cache = Arc::new(TtlCache::with_ttl(config.cache.ttl));
        Ok(Self::new(registry, cache))
    }

    /// Shared response cache.
    pub fn cache(&self) -> &Arc<TtlCache<CachedPayload>> {
        &self.cache
    }

    /// Search movies and shows.
    ///
    /// # Errors
    /// - `MediaSearchError::UnsupportedSource` - No provider registered for `source`
    /// - `MediaSearchError::NotFound` - The provider returned no matches
    /// - `MediaSearchError::UpstreamTimeout` - A lookup timed out
    /// - `MediaSearchError::UpstreamStatus` - A lookup returned a non-success status
    pub async fn search(
        &self,
        source: Source,
        query: &str,
    ) -> Result<Fetched<Vec<SearchResult>>, MediaSearchError> {
        let query = query.trim();
        let key = cache_id(source, query);

        if let Some(CachedPayload::Search(results)) = self.cache.get(CacheNamespace::Search, &key) {
            tracing::debug!(%source, %query, "search served from cache");
            return Ok(Fetched::hit(results));
        }

        let results = self.registry.get(source)?.search(query).await?;
        if results.is_empty() {
            return Err(MediaSearchError::NotFound {
                reason: "No results found".to_string(),
            });
        }

        tracing::debug!(%source, %query, count = results.len(), "search stored in cache");
        self.cache
            .set(CacheNamespace::Search, &key, CachedPayload::Search(results.clone()));
        Ok(Fetched::fresh(results))
    }

    /// Season/episode tree of a movie or show.
    ///
    /// # Errors
    /// - `MediaSearchError::InvalidReference` - `id` carries no provider id
    /// - `MediaSearchError::UnsupportedSource` - No provider registered for `source`
    /// - `MediaSearchError::UpstreamStatus` - The provider rejected the request
    pub async fn details(
        &self,
        source: Source,
        id: &str,
    ) -> Result<Fetched<MediaDetail>, MediaSearchError> {
        let reference = DetailReference::parse(id)?;
        let key = cache_id(source, &reference.to_string());

        if let Some(CachedPayload::Details(detail)) = self.cache.get(CacheNamespace::Details, &key)
        {
            tracing::debug!(%source, %reference, "details served from cache");
            return Ok(Fetched::hit(detail));
        }

        let detail = self.registry.get(source)?.details(&reference).await?;

        tracing::debug!(%source, %reference, seasons = detail.seasons.len(), "details stored in cache");
        self.cache
            .set(CacheNamespace::Details, &key, CachedPayload::Details(detail.clone()));
        Ok(Fetched::fresh(detail))
    }

    /// Playable streams for an encoded content identifier.
    ///
    /// # Errors
    /// - `MediaSearchError::MalformedIdentifier` - `id` is not a valid identifier
    /// - `MediaSearchError::UnsupportedSource` - No provider registered for `source`
    /// - `MediaSearchError::NotFound` - The backend returned no streams
    /// - `MediaSearchError::UpstreamTimeout` - The backend timed out
    pub async fn streams(
        &self,
        source: Source,
        id: &str,
    ) -> Result<Fetched<Vec<StreamDescriptor>>, MediaSearchError> {
        let identifier = ContentIdentifier::decode(id)?;
        let key = cache_id(source, &identifier.encode());

        if let Some(CachedPayload::Streams(streams)) = self.cache.get(CacheNamespace::Stream, &key) {
            tracing::debug!(%source, tmdb_id = identifier.tmdb_id, "streams served from cache");
            return Ok(Fetched::hit(streams));
        }

        let streams = self.registry.get(source)?.streams(&identifier).await?;
        if streams.iter().all(|stream| stream.url.is_empty()) {
            return Err(MediaSearchError::NotFound {
                reason: "No streams found".to_string(),
            });
        }

        tracing::debug!(%source, tmdb_id = identifier.tmdb_id, count = streams.len(), "streams stored in cache");
        self.cache
            .set(CacheNamespace::Stream, &key, CachedPayload::Streams(streams.clone()));
        Ok(Fetched::fresh(streams))
    }
}

fn cache_id(source: Source, canonical: &str) -> String {
    format!("{source}_{canonical}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::providers::MockSource;

    fn service_with(mock: Arc<MockSource>) -> MediaCatalogService {
        let registry = ProviderRegistry::new().with_source(mock);
        MediaCatalogService::new(registry, Arc::new(TtlCache::with_ttl(Duration::from_secs(60))))
    }

    fn movie_id() -> String {
        ContentIdentifier::movie("Heat", "1995", 949, Some("tt0113277".into())).encode()
    }

    #[tokio::test]
    async fn test_search_is_cached() {
        let mock = Arc::new(MockSource::new());
        let service = service_with(mock.clone());

        let first = service.search(Source::Xprime, "Heat").await.unwrap();
        let second = service.search(Source::Xprime, " Heat ").await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.value, second.value);
        assert_eq!(mock.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found_and_not_cached() {
        let mock = Arc::new(MockSource::new().with_search_results(Vec::new()));
        let service = service_with(mock.clone());

        for _ in 0..2 {
            let err = service.search(Source::Xprime, "nothing").await.unwrap_err();
            assert!(matches!(err, MediaSearchError::NotFound { .. }));
            assert_eq!(err.to_string(), "No results found");
        }
        assert_eq!(mock.search_calls(), 2);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_details_cache_key_is_canonical() {
        let mock = Arc::new(MockSource::new());
        let service = service_with(mock.clone());

        service.details(Source::Xprime, "movie/949").await.unwrap();
        let again = service.details(Source::Xprime, "movie:949").await.unwrap();

        assert!(again.cached);
        assert_eq!(again.value.id, "movie/949");
        assert_eq!(mock.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_details_rejects_reference_without_id() {
        let mock = Arc::new(MockSource::new());
        let service = service_with(mock.clone());

        let err = service.details(Source::Xprime, "movie/abc").await.unwrap_err();
        assert!(matches!(err, MediaSearchError::InvalidReference { .. }));
        assert_eq!(mock.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_streams_cached_under_canonical_identifier() {
        let mock = Arc::new(MockSource::new());
        let service = service_with(mock.clone());
        let reordered =
            r#"{"type":"movie","tmdbId":949,"imdbId":"tt0113277","year":"1995","name":"Heat"}"#;

        let first = service.streams(Source::Xprime, &movie_id()).await.unwrap();
        let second = service.streams(Source::Xprime, reordered).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.value, second.value);
        assert_eq!(mock.stream_calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_stream_id_never_reaches_source() {
        let mock = Arc::new(MockSource::new());
        let service = service_with(mock.clone());

        let err = service.streams(Source::Xprime, "not-json").await.unwrap_err();
        assert!(matches!(err, MediaSearchError::MalformedIdentifier(_)));
        assert_eq!(mock.stream_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_streams_is_not_found() {
        let mock = Arc::new(MockSource::new().with_streams(Vec::new()));
        let service = service_with(mock);

        let err = service.streams(Source::Xprime, &movie_id()).await.unwrap_err();
        assert_eq!(err.to_string(), "No streams found");
    }

    #[tokio::test]
    async fn test_upstream_failures_are_not_cached() {
        let mock = Arc::new(MockSource::new().failing_with(|| MediaSearchError::UpstreamStatus {
            status: 500,
            url: "http://upstream.invalid".to_string(),
        }));
        let service = service_with(mock.clone());

        for _ in 0..2 {
            let err = service.streams(Source::Xprime, &movie_id()).await.unwrap_err();
            assert!(err.is_upstream_error());
        }
        assert_eq!(mock.stream_calls(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_source_is_rejected() {
        let service = MediaCatalogService::new(
            ProviderRegistry::new(),
            Arc::new(TtlCache::with_ttl(Duration::from_secs(60))),
        );

        let err = service.search(Source::Xprime, "Heat").await.unwrap_err();
        assert!(matches!(err, MediaSearchError::UnsupportedSource { .. }));
    }

    #[tokio::test]
    async fn test_expired_entries_refetch() {
        let mock = Arc::new(MockSource::new());
        let registry = ProviderRegistry::new().with_source(mock.clone());
        let service = MediaCatalogService::new(
            registry,
            Arc::new(TtlCache::with_ttl(Duration::from_millis(20))),
        );

        service.search(Source::Xprime, "Heat").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let again = service.search(Source::Xprime, "Heat").await.unwrap();

        assert!(!again.cached);
        assert_eq!(mock.search_calls(), 2);
    }
}
