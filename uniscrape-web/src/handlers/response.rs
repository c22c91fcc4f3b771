//! Response envelope and error-to-status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use uniscrape_search::MediaSearchError;

/// Uniform body of every API response.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Payload of a successful request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// RFC 3339 UTC timestamp with millisecond precision
    pub timestamp: String,
    /// Underlying error, development mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error source chain, development mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: timestamp(),
            error: None,
            stack: None,
        }
    }
}

impl Envelope<()> {
    /// Failure envelope without diagnostics.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: timestamp(),
            error: None,
            stack: None,
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Endpoint a failure happened in; picks the generic failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `POST /api/search`
    Search,
    /// `POST /api/details`
    Details,
    /// `POST /api/streams`
    Streams,
}

impl Operation {
    fn subject(self) -> &'static str {
        match self {
            Operation::Search => "search results",
            Operation::Details => "details",
            Operation::Streams => "stream",
        }
    }
}

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request field is absent or blank.
    #[error("{field} is required")]
    MissingParameter {
        /// Name of the missing field
        field: &'static str,
    },

    /// Request body is not a JSON object.
    #[error("Invalid request body: {reason}")]
    InvalidBody {
        /// Parser message
        reason: String,
    },

    /// Lookup failure from the catalogue service.
    #[error(transparent)]
    Search(#[from] MediaSearchError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter { .. } | ApiError::InvalidBody { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Search(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Search(error) => match error {
                MediaSearchError::NotFound { .. } => StatusCode::NOT_FOUND,
                MediaSearchError::UpstreamTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
                MediaSearchError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
                MediaSearchError::UpstreamUnreachable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Client-facing message for this error raised during `operation`.
    pub fn message(&self, operation: Operation) -> String {
        match self {
            ApiError::MissingParameter { .. } => self.to_string(),
            ApiError::InvalidBody { .. } => "Invalid request body".to_string(),
            ApiError::Search(error) if error.is_client_error() => error.to_string(),
            ApiError::Search(error) => match error {
                MediaSearchError::NotFound { .. } => error.to_string(),
                MediaSearchError::UpstreamTimeout { .. } => "Request timeout".to_string(),
                MediaSearchError::UpstreamStatus { status, .. } => {
                    format!("External service error: {status}")
                }
                MediaSearchError::UpstreamUnreachable { .. } => {
                    "No response from external service".to_string()
                }
                _ => format!("Error getting {}", operation.subject()),
            },
        }
    }

    fn source_chain(&self) -> String {
        let mut chain = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            chain.push_str("\n  caused by: ");
            chain.push_str(&cause.to_string());
            current = cause.source();
        }
        chain
    }
}

/// Handler failure carrying enough context to render its envelope.
#[derive(Debug)]
pub struct ApiFailure {
    /// What went wrong
    pub error: ApiError,
    /// Which endpoint failed
    pub operation: Operation,
    /// Attach `error`/`stack` to the envelope
    pub development_mode: bool,
}

impl ApiFailure {
    /// Wraps `error` raised while serving `operation`.
    pub fn new(error: impl Into<ApiError>, operation: Operation, development_mode: bool) -> Self {
        Self {
            error: error.into(),
            operation,
            development_mode,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let mut envelope = Envelope::failure(self.error.message(self.operation));

        let diagnosable = !matches!(self.error, ApiError::MissingParameter { .. });
        if self.development_mode && diagnosable {
            envelope.error = Some(self.error.to_string());
            envelope.stack = Some(self.error.source_chain());
        }

        (status, Json(envelope)).into_response()
    }
}
