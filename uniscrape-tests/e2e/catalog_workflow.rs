//! Search, details and stream workflows through the full router.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uniscrape_core::UniscrapeConfig;
use uniscrape_search::{ContentIdentifier, MediaCatalogService};
use uniscrape_web::{AppState, build_router};

use crate::fake_upstream::FakeUpstream;

fn config_for(upstream: &FakeUpstream) -> UniscrapeConfig {
    let mut config = UniscrapeConfig::for_testing();
    config.server.development_mode = false;
    config.upstream.metadata_base_url = upstream.metadata_base_url();
    config.upstream.stream_base_url = upstream.stream_base_url();
    config.upstream.site_origin = "https://xprime.tv".to_string();
    config.upstream.request_timeout = Duration::from_secs(1);
    config
}

fn router(config: &UniscrapeConfig) -> Router {
    build_router(AppState {
        catalog: MediaCatalogService::from_config(config).unwrap(),
        development_mode: config.server.development_mode,
    })
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn inception_id() -> String {
    ContentIdentifier::movie("Inception", "2010", 27205, Some("tt1375666".to_string())).encode()
}

#[tokio::test]
async fn test_search_single_movie_match() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/search", json!({"query": "Inception"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Search results retrieved successfully");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], "movie/27205");
    assert_eq!(
        data[0]["poster"],
        "https://image.tmdb.org/t/p/original/inception.jpg"
    );
    assert_eq!(upstream.recorder.search_calls(), 2);
}

#[tokio::test]
async fn test_search_interleaves_tv_first_and_strips_season() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/search", json!({"query": "Dark season"})).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["tv/70523", "movie/1", "movie/2"]);
}

#[tokio::test]
async fn test_search_without_results_is_not_found() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/search", json!({"query": "zzzz"})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No results found");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_missing_fields_are_rejected_before_upstream() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/details", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "id is required");

    let (status, body) = post(&app, "/api/search", json!({"query": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "query is required");

    assert_eq!(upstream.recorder.search_calls(), 0);
    assert_eq!(upstream.recorder.detail_calls(), 0);
}

#[tokio::test]
async fn test_movie_details_single_season() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/details", json!({"id": "movie/27205"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "movie");
    let seasons = body["data"]["seasons"].as_array().unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0]["title"], "Movie");
    assert_eq!(seasons[0]["episodes"][0]["id"], inception_id());
}

#[tokio::test]
async fn test_tv_details_skip_specials_and_send_referer() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(
        &app,
        "/api/details",
        json!({"id": "https://watch.example/title/1399?type=tv"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let seasons = body["data"]["seasons"].as_array().unwrap();
    assert_eq!(seasons.len(), 2);
    assert!(seasons.iter().all(|season| season["title"] != "Specials"));
    assert_eq!(seasons[1]["episodes"].as_array().unwrap().len(), 10);
    assert_eq!(
        upstream.recorder.last_referer().as_deref(),
        Some("https://watch.example/")
    );

    let (status, cached) = post(&app, "/api/details", json!({"id": "tv/1399"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["message"], "Details data retrieved successfully (Cached)");
    assert_eq!(upstream.recorder.detail_calls(), 1);
}

#[tokio::test]
async fn test_details_default_referer_is_site_origin() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, _) = post(&app, "/api/details", json!({"id": "movie:27205"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        upstream.recorder.last_referer().as_deref(),
        Some("https://xprime.tv/")
    );
}

#[tokio::test]
async fn test_repeated_stream_request_served_from_cache() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, first) = post(&app, "/api/streams", json!({"id": inception_id()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Stream data retrieved successfully");

    let (status, second) = post(&app, "/api/streams", json!({"id": inception_id()})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Stream data retrieved successfully (Cached)");
    assert_eq!(first["data"], second["data"]);
    assert_eq!(upstream.recorder.stream_calls(), 1);

    let streams = first["data"].as_array().unwrap();
    assert_eq!(streams[0]["quality"], "1080P");
    assert_eq!(streams[0]["subtitles"][0]["label"], "English");
}

#[tokio::test]
async fn test_episode_stream_query_carries_season_and_episode() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));
    let id = ContentIdentifier::episode("Game of Thrones", "2011", 1399, None, 1, 2).encode();

    let (status, _) = post(&app, "/api/streams", json!({"id": id})).await;

    assert_eq!(status, StatusCode::OK);
    let query = upstream.recorder.last_stream_query.lock().clone();
    assert_eq!(query.get("id").map(String::as_str), Some("1399"));
    assert_eq!(query.get("season").map(String::as_str), Some("1"));
    assert_eq!(query.get("episode").map(String::as_str), Some("2"));
    assert!(!query.contains_key("imdb"));
}

#[tokio::test]
async fn test_malformed_stream_id_is_bad_request() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/streams", json!({"id": "movie/27205"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(upstream.recorder.stream_calls(), 0);
}

#[tokio::test]
async fn test_no_streams_is_not_found() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));
    let id = ContentIdentifier::movie("Nothing", "2001", 42, None).encode();

    let (status, body) = post(&app, "/api/streams", json!({"id": id})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No streams found");
}

#[tokio::test]
async fn test_upstream_error_status_is_bad_gateway() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/search", json!({"query": "Broken"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "External service error: 500");

    let (status, body) = post(&app, "/api/details", json!({"id": "movie/500"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "External service error: 500");
}

#[tokio::test]
async fn test_search_fails_whole_when_one_lookup_fails() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    // Westworld: tv succeeds, movie fails. Memento: the reverse.
    for query in ["Westworld", "Memento"] {
        for _ in 0..2 {
            let (status, body) = post(&app, "/api/search", json!({"query": query})).await;

            assert_eq!(status, StatusCode::BAD_GATEWAY, "{query}");
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "External service error: 500");
            assert!(body.get("data").is_none(), "{query}");
        }
    }

    // Failed searches are not cached, so every attempt reached the provider.
    assert!(upstream.recorder.search_calls() >= 4);
}

#[tokio::test]
async fn test_upstream_timeout_is_request_timeout() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let (status, body) = post(&app, "/api/details", json!({"id": "movie/408"})).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["message"], "Request timeout");
}

#[tokio::test]
async fn test_unreachable_upstream_is_service_unavailable() {
    let config = UniscrapeConfig::for_testing();
    let app = router(&config);

    let (status, body) = post(&app, "/api/search", json!({"query": "Inception"})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "No response from external service");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_served_router_answers_over_http() {
    let upstream = FakeUpstream::start().await;
    let app = router(&config_for(&upstream));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let welcome: Value = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(welcome["success"], true);

    let response = client
        .post(format!("http://{addr}/api/search"))
        .header("origin", "http://client.example")
        .json(&json!({"query": "Inception"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
}
