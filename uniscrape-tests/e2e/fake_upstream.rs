//! Fake TMDB-style metadata API and primebox stream backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;

/// Responses slower than this trip the client timeout used in tests.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(3);

/// Observations recorded by the fake provider.
#[derive(Debug, Default)]
pub struct Recorder {
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub last_referer: Mutex<Option<String>>,
    pub last_stream_query: Mutex<HashMap<String, String>>,
}

impl Recorder {
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn last_referer(&self) -> Option<String> {
        self.last_referer.lock().clone()
    }

    fn record_referer(&self, headers: &HeaderMap) {
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        *self.last_referer.lock() = referer;
    }
}

/// Running fake provider.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    pub recorder: Arc<Recorder>,
}

impl FakeUpstream {
    /// Serves the fake provider on an ephemeral port.
    pub async fn start() -> Self {
        let recorder = Arc::new(Recorder::default());
        let app = Router::new()
            .route("/3/search/{kind}", get(search))
            .route("/3/{kind}/{id}", get(details))
            .route("/primebox", get(primebox))
            .with_state(recorder.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorder }
    }

    pub fn metadata_base_url(&self) -> String {
        format!("http://{}/3", self.addr)
    }

    pub fn stream_base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn search(
    State(recorder): State<Arc<Recorder>>,
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorder.search_calls.fetch_add(1, Ordering::SeqCst);
    let query = params.get("query").cloned().unwrap_or_default();

    match (query.as_str(), kind.as_str()) {
        ("Broken", _) | ("Westworld", "movie") | ("Memento", "tv") => {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        ("Westworld", "tv") => Json(json!({
            "results": [{"id": 63247, "name": "Westworld", "poster_path": "/westworld.jpg"}]
        }))
        .into_response(),
        ("Memento", "movie") => Json(json!({
            "results": [{"id": 77, "title": "Memento", "poster_path": "/memento.jpg"}]
        }))
        .into_response(),
        ("Inception", "movie") => Json(json!({
            "results": [{"id": 27205, "title": "Inception", "poster_path": "/inception.jpg"}]
        }))
        .into_response(),
        ("Dark", "tv") => Json(json!({
            "results": [{"id": 70523, "name": "Dark", "poster_path": "/dark.jpg"}]
        }))
        .into_response(),
        ("Dark", "movie") => Json(json!({
            "results": [
                {"id": 1, "title": "Dark Star"},
                {"id": 2, "title": "Dark Water"}
            ]
        }))
        .into_response(),
        _ => Json(json!({"results": []})).into_response(),
    }
}

async fn details(
    State(recorder): State<Arc<Recorder>>,
    Path((kind, id)): Path<(String, u64)>,
    headers: HeaderMap,
) -> Response {
    recorder.detail_calls.fetch_add(1, Ordering::SeqCst);
    recorder.record_referer(&headers);

    match (kind.as_str(), id) {
        (_, 500) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        (_, 408) => {
            tokio::time::sleep(SLOW_RESPONSE).await;
            Json(json!({"id": 408})).into_response()
        }
        ("movie", 27205) => Json(json!({
            "id": 27205,
            "title": "Inception",
            "poster_path": "/inception.jpg",
            "release_date": "2010-07-15",
            "imdb_id": "tt1375666"
        }))
        .into_response(),
        ("tv", 1399) => Json(json!({
            "id": 1399,
            "name": "Game of Thrones",
            "poster_path": "/got.jpg",
            "external_ids": {"imdb_id": "tt0944947"},
            "seasons": [
                {"season_number": 0, "episode_count": 3, "name": "Specials", "air_date": "2010-12-05"},
                {"season_number": 1, "episode_count": 10, "name": "Season 1", "air_date": "2011-04-17"},
                {"season_number": 2, "episode_count": 10, "name": "Season 2", "air_date": "2012-04-01"}
            ]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn primebox(
    State(recorder): State<Arc<Recorder>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorder.stream_calls.fetch_add(1, Ordering::SeqCst);
    let name = params.get("name").cloned().unwrap_or_default();
    *recorder.last_stream_query.lock() = params;

    match name.as_str() {
        "Nothing" => Json(json!({"streams": {}, "subtitles": []})).into_response(),
        "Broken" => StatusCode::BAD_GATEWAY.into_response(),
        _ => Json(json!({
            "streams": {
                "720P": "https://cdn.example/720.m3u8",
                "1080P": "https://cdn.example/1080.m3u8"
            },
            "subtitles": [{"file": "https://cdn.example/en.vtt", "label": "English"}]
        }))
        .into_response(),
    }
}
