//! CLI command implementations

use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use uniscrape_core::UniscrapeConfig;
use uniscrape_search::{MediaCatalogService, Source};
use uniscrape_web::run_server;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Server {
        /// Host to bind to, overrides UNISCRAPE_HOST
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to, overrides UNISCRAPE_PORT
        #[arg(short, long)]
        port: Option<u16>,
        /// Include error details in failure responses
        #[arg(long)]
        dev: bool,
    },
    /// Search movies and shows
    Search {
        /// Search text
        query: String,
        /// Source to query
        #[arg(long, default_value = "xprime")]
        source: String,
    },
    /// Show the season/episode tree of a movie or show
    Details {
        /// Reference such as `movie/27205`, `tv:1399` or a watch-page URL
        id: String,
        /// Source to query
        #[arg(long, default_value = "xprime")]
        source: String,
    },
    /// Resolve playable streams for an encoded content identifier
    Streams {
        /// Identifier taken from a details episode
        id: String,
        /// Source to query
        #[arg(long, default_value = "xprime")]
        source: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = UniscrapeConfig::from_env();

    match command {
        Commands::Server { host, port, dev } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.server.development_mode |= dev;

            run_server(config).await.context("API server stopped")
        }
        Commands::Search { query, source } => {
            let (catalog, source) = lookup_context(&config, &source)?;
            let fetched = catalog.search(source, &query).await?;
            print_json(&fetched.value)
        }
        Commands::Details { id, source } => {
            let (catalog, source) = lookup_context(&config, &source)?;
            let fetched = catalog.details(source, &id).await?;
            print_json(&fetched.value)
        }
        Commands::Streams { id, source } => {
            let (catalog, source) = lookup_context(&config, &source)?;
            let fetched = catalog.streams(source, &id).await?;
            print_json(&fetched.value)
        }
    }
}

fn lookup_context(
    config: &UniscrapeConfig,
    source: &str,
) -> anyhow::Result<(MediaCatalogService, Source)> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let catalog =
        MediaCatalogService::from_config(config).context("Failed to initialize catalogue")?;
    let source: Source = source.parse()?;
    tracing::debug!(%source, cache_ttl_secs = config.cache.ttl.as_secs(), "running one-off lookup");
    Ok((catalog, source))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
