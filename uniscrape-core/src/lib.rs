//! Uniscrape Core - Shared building blocks for the aggregation API
//!
//! This crate provides the pieces every other Uniscrape crate leans on:
//! centralized configuration, the time-based response cache, and tracing
//! setup for the binary.

pub mod cache;
pub mod config;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use cache::{CacheNamespace, TtlCache};
pub use config::UniscrapeConfig;

/// Core errors raised while bootstrapping Uniscrape.
#[derive(Debug, thiserror::Error)]
pub enum UniscrapeError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UniscrapeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            UniscrapeError::Configuration { reason } => format!("Invalid configuration: {reason}"),
            UniscrapeError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UniscrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_io_details() {
        let io = UniscrapeError::from(std::io::Error::other("disk full"));
        assert_eq!(io.user_message(), "File system error occurred");

        let config = UniscrapeError::Configuration {
            reason: "cache TTL must be greater than zero".to_string(),
        };
        assert_eq!(
            config.user_message(),
            "Invalid configuration: cache TTL must be greater than zero"
        );
    }
}
