//! Centralized configuration for Uniscrape.
//!
//! All tunable parameters and upstream endpoints are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use crate::{Result, UniscrapeError};

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 10);

/// Longest accepted cache lifetime.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Central configuration for all Uniscrape components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct UniscrapeConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub upstream: UpstreamConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Expose error details in responses
    pub development_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            development_mode: false,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to every stored entry
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Third-party provider endpoints and HTTP client settings.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the TMDB-shaped metadata API
    pub metadata_base_url: String,
    /// Optional metadata API key, sent as `api_key`
    pub api_key: Option<String>,
    /// Image CDN prefix for relative poster paths
    pub image_base_url: String,
    /// Origin used for `Referer`/`Origin` when a reference carries none
    pub site_origin: String,
    /// Base URL of the stream resolving backend
    pub stream_base_url: String,
    /// Per-request timeout for upstream calls
    pub request_timeout: Duration,
    /// User agent for upstream requests
    pub user_agent: &'static str,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: None,
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            site_origin: "https://xprime.tv".to_string(),
            stream_base_url: "https://backend.xprime.tv".to_string(),
            request_timeout: Duration::from_secs(15),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36",
        }
    }
}

impl UniscrapeConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server configuration overrides
        if let Ok(host) = std::env::var("UNISCRAPE_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("UNISCRAPE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(dev) = std::env::var("UNISCRAPE_DEV_MODE") {
            config.server.development_mode = dev.parse().unwrap_or(false);
        }

        // Cache configuration overrides
        if let Ok(ttl) = std::env::var("UNISCRAPE_CACHE_TTL_SECS") {
            if let Ok(seconds) = ttl.parse::<u64>() {
                config.cache.ttl = Duration::from_secs(seconds);
            }
        }

        // Upstream configuration overrides
        if let Ok(url) = std::env::var("UNISCRAPE_METADATA_URL") {
            config.upstream.metadata_base_url = url;
        }

        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                config.upstream.api_key = Some(key);
            }
        }

        if let Ok(url) = std::env::var("UNISCRAPE_IMAGE_BASE_URL") {
            config.upstream.image_base_url = url;
        }

        if let Ok(origin) = std::env::var("UNISCRAPE_SITE_ORIGIN") {
            config.upstream.site_origin = origin;
        }

        if let Ok(url) = std::env::var("UNISCRAPE_STREAM_URL") {
            config.upstream.stream_base_url = url;
        }

        if let Ok(timeout) = std::env::var("UNISCRAPE_REQUEST_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.upstream.request_timeout = Duration::from_secs(seconds);
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Upstream URLs point at an unroutable local port so an accidental
    /// network call fails fast instead of reaching a real provider.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                development_mode: true,
                ..Default::default()
            },
            cache: CacheConfig {
                ttl: Duration::from_secs(60),
            },
            upstream: UpstreamConfig {
                metadata_base_url: "http://127.0.0.1:9".to_string(),
                stream_base_url: "http://127.0.0.1:9".to_string(),
                request_timeout: Duration::from_secs(2),
                ..Default::default()
            },
        }
    }

    /// Creates a configuration for local development.
    pub fn for_development() -> Self {
        Self {
            server: ServerConfig {
                development_mode: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Checks that the configuration can be used to start the server.
    ///
    /// # Errors
    ///
    /// - `UniscrapeError::Configuration` - If the cache TTL or request timeout is zero,
    ///   the cache TTL exceeds `MAX_CACHE_TTL`, or an upstream URL is empty
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl.is_zero() {
            return Err(UniscrapeError::Configuration {
                reason: "cache TTL must be greater than zero".to_string(),
            });
        }

        if self.cache.ttl > MAX_CACHE_TTL {
            return Err(UniscrapeError::Configuration {
                reason: format!(
                    "cache TTL must not exceed {} seconds",
                    MAX_CACHE_TTL.as_secs()
                ),
            });
        }

        if self.upstream.request_timeout.is_zero() {
            return Err(UniscrapeError::Configuration {
                reason: "request timeout must be greater than zero".to_string(),
            });
        }

        let urls = [
            ("metadata URL", &self.upstream.metadata_base_url),
            ("image base URL", &self.upstream.image_base_url),
            ("site origin", &self.upstream.site_origin),
            ("stream URL", &self.upstream.stream_base_url),
        ];
        for (name, value) in urls {
            if value.trim().is_empty() {
                return Err(UniscrapeError::Configuration {
                    reason: format!("{name} must not be empty"),
                });
            }
        }

        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = UniscrapeConfig::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.ttl, Duration::from_secs(36_000));
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(15));
        assert!(config.upstream.api_key.is_none());
        assert!(!config.server.development_mode);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_presets() {
        let testing_config = UniscrapeConfig::for_testing();
        assert!(testing_config.server.development_mode);
        assert_eq!(testing_config.cache.ttl, Duration::from_secs(60));
        assert!(testing_config.validate().is_ok());

        let dev_config = UniscrapeConfig::for_development();
        assert!(dev_config.server.development_mode);
        assert_eq!(dev_config.cache.ttl, DEFAULT_CACHE_TTL);
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = UniscrapeConfig::default();
        config.cache.ttl = Duration::ZERO;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache TTL"));
    }

    #[test]
    fn test_validate_rejects_oversized_ttl() {
        let mut config = UniscrapeConfig::default();
        config.cache.ttl = MAX_CACHE_TTL;
        assert!(config.validate().is_ok());

        config.cache.ttl = Duration::from_secs(u64::MAX);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, UniscrapeError::Configuration { .. }));
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = UniscrapeConfig::default();
        config.upstream.stream_base_url = "  ".to_string();

        assert!(matches!(
            config.validate(),
            Err(UniscrapeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("UNISCRAPE_PORT", "8080");
            std::env::set_var("UNISCRAPE_DEV_MODE", "true");
            std::env::set_var("UNISCRAPE_CACHE_TTL_SECS", "120");
            std::env::set_var("UNISCRAPE_REQUEST_TIMEOUT_SECS", "5");
            std::env::set_var("TMDB_API_KEY", "secret");
        }

        let config = UniscrapeConfig::from_env();

        assert_eq!(config.server.port, 8080);
        assert!(config.server.development_mode);
        assert_eq!(config.cache.ttl, Duration::from_secs(120));
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(5));
        assert_eq!(config.upstream.api_key.as_deref(), Some("secret"));

        // Cleanup
        unsafe {
            std::env::remove_var("UNISCRAPE_PORT");
            std::env::remove_var("UNISCRAPE_DEV_MODE");
            std::env::remove_var("UNISCRAPE_CACHE_TTL_SECS");
            std::env::remove_var("UNISCRAPE_REQUEST_TIMEOUT_SECS");
            std::env::remove_var("TMDB_API_KEY");
        }
    }
}
