//! Xprime source: TMDB metadata plus the Xprime stream backend.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use uniscrape_core::config::UpstreamConfig;

use super::MediaSource;
use crate::errors::MediaSearchError;
use crate::identifier::ContentIdentifier;
use crate::normalizer::{DEFAULT_NOISE_TERMS, Normalizer, QueryCleaner};
use crate::reference::DetailReference;
use crate::tmdb::{DetailPayload, SearchPage};
use crate::types::{MediaDetail, MediaKind, SearchResult, Source, StreamDescriptor, Subtitle};
use crate::upstream::{UpstreamClient, origin_headers};

/// Source backed by a TMDB-compatible metadata API and the Xprime
/// `primebox` stream resolver.
#[derive(Debug)]
pub struct XprimeSource {
    upstream: UpstreamClient,
    normalizer: Normalizer,
    cleaner: QueryCleaner,
    metadata_base_url: String,
    api_key: Option<String>,
    site_origin: String,
    stream_base_url: String,
}

/// Response of the `primebox` endpoint.
#[derive(Debug, Deserialize)]
struct PrimeboxResponse {
    /// Quality label to media URL
    streams: Option<HashMap<String, String>>,
    subtitles: Option<Vec<PrimeboxSubtitle>>,
}

#[derive(Debug, Deserialize)]
struct PrimeboxSubtitle {
    file: String,
    label: Option<String>,
}

impl XprimeSource {
    /// Creates the source from upstream configuration.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::ProviderError` - If the HTTP client cannot be built
    pub fn new(config: &UpstreamConfig) -> Result<Self, MediaSearchError> {
        Ok(Self {
            upstream: UpstreamClient::new(config.request_timeout, config.user_agent)?,
            normalizer: Normalizer::new(config.image_base_url.as_str()),
            cleaner: QueryCleaner::new(DEFAULT_NOISE_TERMS)?,
            metadata_base_url: config.metadata_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            site_origin: config.site_origin.clone(),
            stream_base_url: config.stream_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn metadata_url(&self, path: &str) -> String {
        format!("{}/{}", self.metadata_base_url, path)
    }

    fn with_api_key<'a>(&self, mut query: Vec<(&'a str, String)>) -> Vec<(&'a str, String)> {
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }
        query
    }

    async fn search_titles(&self, kind: MediaKind, query: &str) -> Result<SearchPage, MediaSearchError> {
        let url = self.metadata_url(&format!("search/{kind}"));
        let params = self.with_api_key(vec![("query", query.to_string())]);
        self.upstream.get_json(&url, &params, HeaderMap::new()).await
    }

    fn stream_params(identifier: &ContentIdentifier) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("name", identifier.name.clone()),
            ("year", identifier.year.clone()),
            ("id", identifier.tmdb_id.to_string()),
        ];
        if let Some(imdb) = &identifier.imdb_id {
            params.push(("imdb", imdb.clone()));
        }
        if let (Some(season), Some(episode)) = (identifier.season, identifier.episode) {
            params.push(("season", season.to_string()));
            params.push(("episode", episode.to_string()));
        }
        params
    }

    fn into_descriptors(response: PrimeboxResponse) -> Vec<StreamDescriptor> {
        let subtitles: Vec<Subtitle> = response
            .subtitles
            .unwrap_or_default()
            .into_iter()
            .filter(|subtitle| !subtitle.file.is_empty())
            .map(|subtitle| Subtitle {
                url: subtitle.file,
                label: subtitle.label,
            })
            .collect();
        let subtitles = (!subtitles.is_empty()).then_some(subtitles);

        let mut streams: Vec<(String, String)> = response
            .streams
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, url)| !url.is_empty())
            .collect();
        streams.sort_by(|(a, _), (b, _)| quality_rank(b).cmp(&quality_rank(a)).then_with(|| a.cmp(b)));

        streams
            .into_iter()
            .map(|(quality, url)| StreamDescriptor {
                url,
                quality: Some(quality),
                subtitles: subtitles.clone(),
            })
            .collect()
    }
}

/// Vertical resolution implied by a quality label.
fn quality_rank(label: &str) -> u32 {
    let lower = label.to_lowercase();
    if lower.contains("4k") {
        return 2160;
    }
    let digits: String = lower.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[async_trait]
impl MediaSource for XprimeSource {
    fn source(&self) -> Source {
        Source::Xprime
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MediaSearchError> {
        let cleaned = self.cleaner.clean(query);
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let (tv, movies) = futures::try_join!(
            self.search_titles(MediaKind::Tv, &cleaned),
            self.search_titles(MediaKind::Movie, &cleaned),
        )?;
        tracing::debug!(
            query = %cleaned,
            tv = tv.results.len(),
            movies = movies.results.len(),
            "search lookups finished"
        );

        Ok(self.normalizer.search_results(&tv.results, &movies.results))
    }

    async fn details(&self, reference: &DetailReference) -> Result<MediaDetail, MediaSearchError> {
        let url = self.metadata_url(&format!("{}/{}", reference.kind, reference.tmdb_id));
        let params = self.with_api_key(vec![("append_to_response", "external_ids".to_string())]);
        let headers = origin_headers(reference.origin_or(&self.site_origin));

        let payload: DetailPayload = self.upstream.get_json(&url, &params, headers).await?;
        Ok(self.normalizer.media_detail(reference, &payload))
    }

    async fn streams(
        &self,
        identifier: &ContentIdentifier,
    ) -> Result<Vec<StreamDescriptor>, MediaSearchError> {
        let url = format!("{}/primebox", self.stream_base_url);
        let params = Self::stream_params(identifier);
        let headers = origin_headers(&self.site_origin);

        let response: PrimeboxResponse = self.upstream.get_json(&url, &params, headers).await?;
        Ok(Self::into_descriptors(response))
    }
}
