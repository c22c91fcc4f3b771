//! HTTP request handlers organized by functionality

pub mod api;
pub mod response;

// Re-export handler functions
pub use api::{CatalogRequest, api_details, api_search, api_streams, welcome};
pub use response::{ApiError, ApiFailure, Envelope, Operation};
