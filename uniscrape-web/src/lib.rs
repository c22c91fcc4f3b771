//! Uniscrape Web - JSON API Server

#![deny(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Exposes search, details and stream lookup as `POST` endpoints wrapped
//! in a uniform `{ success, message, data, timestamp }` envelope.

pub mod handlers;
pub mod server;

// Re-export main types
pub use handlers::{ApiError, Envelope};
pub use server::{AppState, ServerError, build_router, run_server, spawn_cache_sweeper};
