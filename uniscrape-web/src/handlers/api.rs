//! API handlers for search, details and stream lookup

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use uniscrape_search::{Fetched, MediaDetail, SearchResult, Source, StreamDescriptor};

use super::response::{ApiError, ApiFailure, Envelope, Operation};
use crate::server::AppState;

/// Body accepted by every catalogue endpoint.
///
/// `id` may be sent as a string or a number.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogRequest {
    /// Search text
    #[serde(default)]
    pub query: Option<String>,
    /// Detail reference or encoded content identifier
    #[serde(default)]
    pub id: Option<Value>,
    /// Source name, defaults to `xprime`
    #[serde(default)]
    pub source: Option<String>,
}

impl CatalogRequest {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody {
            reason: e.to_string(),
        })
    }

    fn query(&self) -> Result<&str, ApiError> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or(ApiError::MissingParameter { field: "query" })
    }

    fn id(&self) -> Result<String, ApiError> {
        let id = match &self.id {
            Some(Value::String(id)) => id.trim().to_string(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        if id.is_empty() {
            return Err(ApiError::MissingParameter { field: "id" });
        }
        Ok(id)
    }

    fn source(&self) -> Result<Source, ApiError> {
        match self.source.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name.parse()?),
            _ => Ok(Source::default()),
        }
    }

    fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(Source::default().as_str())
    }
}

fn message(fresh: &str, cached_prefix: &str, cached: bool) -> String {
    if cached {
        format!("{cached_prefix} (Cached)")
    } else {
        fresh.to_string()
    }
}

/// Logs a failed request with its context and wraps it for rendering.
fn reject(
    state: &AppState,
    operation: Operation,
    error: ApiError,
    subject: &str,
    source: &str,
) -> ApiFailure {
    let status = error.status();
    let upstream = matches!(&error, ApiError::Search(e) if e.is_upstream_error());
    if status.is_server_error() {
        tracing::error!(?operation, subject, source, %status, upstream, error = %error, "request failed");
    } else {
        tracing::warn!(?operation, subject, source, %status, error = %error, "request rejected");
    }
    ApiFailure::new(error, operation, state.development_mode)
}

/// Welcome document listing the available endpoints.
pub async fn welcome() -> Json<Envelope<Value>> {
    Json(Envelope::success(
        json!({
            "name": "Uniscrape",
            "description": "Unified search, details and stream lookup for movies and TV shows",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "search": {"method": "POST", "url": "/api/search"},
                "details": {"method": "POST", "url": "/api/details"},
                "streams": {"method": "POST", "url": "/api/streams"},
            },
        }),
        "Welcome to the Uniscrape API",
    ))
}

/// `POST /api/search` with `{ query, source? }`.
///
/// # Errors
///
/// Returns an `ApiFailure` rendered as the error envelope for the failing case.
pub async fn api_search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<Vec<SearchResult>>>, ApiFailure> {
    let operation = Operation::Search;
    let request = CatalogRequest::parse(&body).map_err(|e| reject(&state, operation, e, "", ""))?;
    let source_label = request.source_label().to_string();
    let query = request
        .query()
        .map_err(|e| reject(&state, operation, e, "", &source_label))?;

    let fetched: Fetched<Vec<SearchResult>> = async {
        let source = request.source()?;
        Ok::<_, ApiError>(state.catalog.search(source, query).await?)
    }
    .await
    .map_err(|e| reject(&state, operation, e, query, &source_label))?;

    tracing::info!(query, source = %source_label, cached = fetched.cached, count = fetched.value.len(), "search served");
    let message = message(
        "Search results retrieved successfully",
        "Search data retrieved successfully",
        fetched.cached,
    );
    Ok(Json(Envelope::success(fetched.value, message)))
}

/// `POST /api/details` with `{ id, source? }`.
///
/// # Errors
///
/// Returns an `ApiFailure` rendered as the error envelope for the failing case.
pub async fn api_details(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<MediaDetail>>, ApiFailure> {
    let operation = Operation::Details;
    let request = CatalogRequest::parse(&body).map_err(|e| reject(&state, operation, e, "", ""))?;
    let source_label = request.source_label().to_string();
    let id = request
        .id()
        .map_err(|e| reject(&state, operation, e, "", &source_label))?;

    let fetched: Fetched<MediaDetail> = async {
        let source = request.source()?;
        Ok::<_, ApiError>(state.catalog.details(source, &id).await?)
    }
    .await
    .map_err(|e| reject(&state, operation, e, &id, &source_label))?;

    tracing::info!(id = %id, source = %source_label, cached = fetched.cached, "details served");
    let message = message(
        "Details data retrieved successfully",
        "Details data retrieved successfully",
        fetched.cached,
    );
    Ok(Json(Envelope::success(fetched.value, message)))
}

/// `POST /api/streams` with `{ id, source? }`.
///
/// # Errors
///
/// Returns an `ApiFailure` rendered as the error envelope for the failing case.
pub async fn api_streams(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Envelope<Vec<StreamDescriptor>>>, ApiFailure> {
    let operation = Operation::Streams;
    let request = CatalogRequest::parse(&body).map_err(|e| reject(&state, operation, e, "", ""))?;
    let source_label = request.source_label().to_string();
    let id = request
        .id()
        .map_err(|e| reject(&state, operation, e, "", &source_label))?;

    let fetched: Fetched<Vec<StreamDescriptor>> = async {
        let source = request.source()?;
        Ok::<_, ApiError>(state.catalog.streams(source, &id).await?)
    }
    .await
    .map_err(|e| reject(&state, operation, e, &id, &source_label))?;

    tracing::info!(id = %id, source = %source_label, cached = fetched.cached, count = fetched.value.len(), "streams served");
    let message = message(
        "Stream data retrieved successfully",
        "Stream data retrieved successfully",
        fetched.cached,
    );
    Ok(Json(Envelope::success(fetched.value, message)))
}
