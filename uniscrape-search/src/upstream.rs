//! HTTP access to third-party providers with failure classification.
//!
//! Every provider call funnels through `UpstreamClient::get_json`, which
//! turns transport and status failures into the upstream variants of
//! `MediaSearchError` before anything above it sees them.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::de::DeserializeOwned;

use crate::errors::MediaSearchError;

/// Shared HTTP client for metadata and stream providers.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Creates a client with a per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::ProviderError` - If the HTTP client cannot be built
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, MediaSearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| MediaSearchError::ProviderError {
                reason: format!("HTTP client setup failed: {e}"),
            })?;
        Ok(Self { client })
    }

    /// GETs `url` with `query` and `headers` and decodes a JSON body.
    ///
    /// # Errors
    ///
    /// - `MediaSearchError::UpstreamTimeout` - The request exceeded the client timeout
    /// - `MediaSearchError::UpstreamStatus` - The provider answered with a non-success status
    /// - `MediaSearchError::UpstreamUnreachable` - No response was received
    /// - `MediaSearchError::ParseError` - The body is not the expected JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: HeaderMap,
    ) -> Result<T, MediaSearchError> {
        tracing::debug!(%url, "upstream request");

        let response = self
            .client
            .get(url)
            .query(query)
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "upstream returned error status");
            return Err(MediaSearchError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| classify(url, e))
    }
}

/// `Referer`/`Origin` pair presenting requests as coming from `origin`.
pub fn origin_headers(origin: &str) -> HeaderMap {
    let origin = origin.trim_end_matches('/');
    let mut headers = HeaderMap::new();
    if let Ok(referer) = HeaderValue::from_str(&format!("{origin}/")) {
        headers.insert(REFERER, referer);
    }
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ORIGIN, value);
    }
    headers
}

/// Maps a transport error onto the upstream error taxonomy.
pub fn classify(url: &str, error: reqwest::Error) -> MediaSearchError {
    if error.is_timeout() {
        MediaSearchError::UpstreamTimeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        MediaSearchError::UpstreamStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }
    } else if error.is_decode() {
        MediaSearchError::ParseError {
            reason: format!("Invalid response from {url}: {error}"),
        }
    } else {
        MediaSearchError::UpstreamUnreachable {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_headers() {
        let headers = origin_headers("https://xprime.tv/");

        assert_eq!(headers[REFERER].to_str().unwrap(), "https://xprime.tv/");
        assert_eq!(headers[ORIGIN].to_str().unwrap(), "https://xprime.tv");
    }

    #[test]
    fn test_invalid_header_values_are_skipped() {
        let headers = origin_headers("bad\norigin");
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let client = UpstreamClient::new(Duration::from_secs(2), "uniscrape-test").unwrap();

        let result = client
            .get_json::<serde_json::Value>("http://127.0.0.1:9/search", &[], HeaderMap::new())
            .await;

        assert!(matches!(
            result,
            Err(MediaSearchError::UpstreamUnreachable { .. })
        ));
    }
}
