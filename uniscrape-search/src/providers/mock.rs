//! Mock source implementation for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::MediaSource;
use crate::errors::MediaSearchError;
use crate::identifier::ContentIdentifier;
use crate::reference::DetailReference;
use crate::types::{Episode, MediaDetail, SearchResult, Season, Source, StreamDescriptor};

/// In-memory source with canned responses and call counters.
///
/// Without overrides it echoes the query as a single movie match and returns
/// one 1080P stream. Details are always a one-episode movie tree.
#[derive(Debug, Default)]
pub struct MockSource {
    search_results: Option<Vec<SearchResult>>,
    streams: Option<Vec<StreamDescriptor>>,
    failure: Option<fn() -> MediaSearchError>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    stream_calls: AtomicUsize,
}

impl MockSource {
    /// Creates a mock source with default canned data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `results` from every search.
    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = Some(results);
        self
    }

    /// Returns `streams` from every stream lookup.
    pub fn with_streams(mut self, streams: Vec<StreamDescriptor>) -> Self {
        self.streams = Some(streams);
        self
    }

    /// Fails every operation with the error `make` builds.
    pub fn failing_with(mut self, make: fn() -> MediaSearchError) -> Self {
        self.failure = Some(make);
        self
    }

    /// Number of `search` invocations so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `details` invocations so far.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Number of `streams` invocations so far.
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> Result<(), MediaSearchError> {
        match self.failure {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaSource for MockSource {
    fn source(&self) -> Source {
        Source::Xprime
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MediaSearchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.fail()?;

        Ok(self.search_results.clone().unwrap_or_else(|| {
            vec![SearchResult {
                id: "movie/1".to_string(),
                title: query.to_string(),
                poster: String::new(),
            }]
        }))
    }

    async fn details(&self, reference: &DetailReference) -> Result<MediaDetail, MediaSearchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.fail()?;

        let identifier = ContentIdentifier::movie("Mock Movie", "2024", reference.tmdb_id, None);
        Ok(MediaDetail {
            id: reference.to_string(),
            title: "Mock Movie".to_string(),
            poster: String::new(),
            kind: reference.kind,
            seasons: vec![Season {
                title: "Movie".to_string(),
                poster: String::new(),
                episodes: vec![Episode {
                    title: "Mock Movie".to_string(),
                    id: identifier.encode(),
                }],
            }],
        })
    }

    async fn streams(
        &self,
        identifier: &ContentIdentifier,
    ) -> Result<Vec<StreamDescriptor>, MediaSearchError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.fail()?;

        Ok(self.streams.clone().unwrap_or_else(|| {
            vec![StreamDescriptor {
                url: format!("https://cdn.invalid/{}.m3u8", identifier.tmdb_id),
                quality: Some("1080P".to_string()),
                subtitles: None,
            }]
        }))
    }
}
