//! JSON API server for Uniscrape
//!
//! Wires the catalogue service into an axum router with permissive CORS
//! and request tracing, then serves it on the configured address.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uniscrape_core::{TtlCache, UniscrapeConfig, UniscrapeError};
use uniscrape_search::{MediaCatalogService, MediaSearchError};

use crate::handlers::{api_details, api_search, api_streams, welcome};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cache-first catalogue service
    pub catalog: MediaCatalogService,
    /// Attach error details to failure envelopes
    pub development_mode: bool,
}

/// Failures that prevent the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] UniscrapeError),

    /// Catalogue sources could not be constructed.
    #[error("Failed to initialize catalogue: {0}")]
    Catalog(#[from] MediaSearchError),

    /// Binding or serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/api/search", post(api_search))
        .route("/api/details", post(api_details))
        .route("/api/streams", post(api_streams))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Upper bound on the pause between two cache sweeps.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawns a task that drops expired cache entries every `period`.
///
/// Entries whose key is never requested again would otherwise stay in the
/// map for the life of the process.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn spawn_cache_sweeper<V>(cache: Arc<TtlCache<V>>, period: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = cache.len(), "swept expired cache entries");
            }
        }
    })
}

/// Starts the API server and serves until the process exits.
///
/// # Errors
///
/// - `ServerError::Config` - If `config` fails validation
/// - `ServerError::Catalog` - If a catalogue source cannot be constructed
/// - `ServerError::Io` - If the listener cannot bind or serving fails
pub async fn run_server(config: UniscrapeConfig) -> Result<(), ServerError> {
    config.validate()?;

    let catalog = MediaCatalogService::from_config(&config)?;
    let sweeper = spawn_cache_sweeper(
        Arc::clone(catalog.cache()),
        config.cache.ttl.min(MAX_SWEEP_INTERVAL),
    );

    let app = build_router(AppState {
        catalog,
        development_mode: config.server.development_mode,
    });

    let address = config.bind_address();
    let served = async {
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!(
            %address,
            development_mode = config.server.development_mode,
            cache_ttl_secs = config.cache.ttl.as_secs(),
            "Uniscrape API server listening"
        );
        axum::serve(listener, app).await
    }
    .await;

    sweeper.abort();
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use uniscrape_core::CacheNamespace;
    use uniscrape_search::{MediaSearchError, MockSource, ProviderRegistry};

    use super::*;

    fn router_with(mock: MockSource, development_mode: bool) -> Router {
        let registry = ProviderRegistry::new().with_source(Arc::new(mock));
        let catalog =
            MediaCatalogService::new(registry, Arc::new(TtlCache::with_ttl(Duration::from_secs(60))));
        build_router(AppState {
            catalog,
            development_mode,
        })
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_welcome() {
        let app = router_with(MockSource::new(), false);
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["endpoints"]["search"]["url"], "/api/search");
    }

    #[tokio::test]
    async fn test_search_success_and_cache_message() {
        let app = router_with(MockSource::new(), false);

        let (status, body) = post_json(app.clone(), "/api/search", r#"{"query":"Heat"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Search results retrieved successfully");
        assert_eq!(body["data"][0]["title"], "Heat");

        let (_, body) = post_json(app, "/api/search", r#"{"query":"Heat"}"#).await;
        assert_eq!(body["message"], "Search data retrieved successfully (Cached)");
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let app = router_with(MockSource::new(), true);
        let (status, body) = post_json(app, "/api/search", "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "query is required");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_unknown_source_is_bad_request() {
        let app = router_with(MockSource::new(), false);
        let (status, _) =
            post_json(app, "/api/details", r#"{"id":"movie/1","source":"elsewhere"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_status_maps_to_bad_gateway() {
        let mock = MockSource::new().failing_with(|| MediaSearchError::UpstreamStatus {
            status: 500,
            url: "http://upstream.invalid".to_string(),
        });
        let app = router_with(mock, false);

        let (status, body) = post_json(app, "/api/details", r#"{"id":"tv/1399"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "External service error: 500");
        assert!(body.get("error").is_none());
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_development_mode_exposes_error() {
        let mock = MockSource::new().failing_with(|| MediaSearchError::ParseError {
            reason: "unexpected payload".to_string(),
        });
        let app = router_with(mock, true);

        let (status, body) = post_json(app, "/api/search", r#"{"query":"Heat"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error getting search results");
        assert_eq!(body["error"], "Parse error: unexpected payload");
        assert!(body["stack"].is_string());
    }

    #[tokio::test]
    async fn test_cache_sweeper_drops_stale_entries() {
        let cache = Arc::new(TtlCache::with_ttl(Duration::from_millis(10)));
        cache.set(CacheNamespace::Search, "xprime_heat", 1);
        cache.set(CacheNamespace::Stream, "xprime_heat", 2);
        assert_eq!(cache.len(), 2);

        let sweeper = spawn_cache_sweeper(Arc::clone(&cache), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_run_server_rejects_oversized_ttl() {
        let mut config = UniscrapeConfig::for_testing();
        config.cache.ttl = Duration::from_secs(u64::MAX);

        assert!(matches!(
            run_server(config).await,
            Err(ServerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_run_server_rejects_invalid_config() {
        let mut config = UniscrapeConfig::for_testing();
        config.cache.ttl = Duration::ZERO;

        assert!(matches!(
            run_server(config).await,
            Err(ServerError::Config(_))
        ));
    }
}
