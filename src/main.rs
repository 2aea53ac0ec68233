//! # Journal Scraper
//!
//! Periodically scrapes a journal's table of contents and keeps a persisted,
//! deduplicated, newest-first list of the articles it has seen.
//!
//! ## Usage
//!
//! ```sh
//! journal_scraper --limit 1000 disk --path /var/lib/journal/articles.json
//! ```
//!
//! ## Architecture
//!
//! Each run is one pass of a short pipeline:
//! 1. **Scraping**: Fetch the listing page and extract one article per link
//! 2. **Sanity check**: Fail loudly if the batch is implausibly small
//! 3. **Load**: Read the persisted article list (missing means empty)
//! 4. **Merge**: Dedupe by URL, sort newest first, truncate to the limit
//! 5. **Save**: Write the whole list back to the backend

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod backends;
mod cli;
mod config;
mod models;
mod scrapers;
mod store;
#[cfg(test)]
mod test_support;
mod utils;

use backends::Backend;
use backends::disk::DiskBackend;
use backends::object_store::ObjectStoreBackend;
use backends::retry::RetryBackend;
use cli::{Cli, StoreCommand};
use config::{ScrapeConfig, load_config};
use models::Article;
use store::{ArticleStore, StoreError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("journal_scraper starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(config_file = ?args.config, "Parsed CLI arguments");

    let base_config = match &args.config {
        Some(path) => load_config(path).await.inspect_err(|e| {
            error!(error = %e, "Failed to load scrape configuration");
        })?,
        None => ScrapeConfig::default(),
    };
    let config = args.scrape_config(base_config);
    info!(
        page_url = %config.page_url,
        selector = %config.selector,
        limit = config.limit,
        "Resolved scrape configuration"
    );

    let (connect_timeout, request_timeout) = args.http_timeouts();
    let client = http_client(connect_timeout, request_timeout)?;

    // ---- Scrape ----
    let observed_at = Utc::now();
    let articles = scrapers::wiley::index_articles(&client, &config, observed_at)
        .await
        .inspect_err(|e| error!(error = %e, "Scrape failed"))?;
    scrapers::ensure_plausible(&articles, config.min_articles)
        .inspect_err(|e| error!(error = %e, "Refusing to store scraped batch"))?;

    // ---- Persist ----
    match args.store() {
        StoreCommand::Disk { path } => {
            persist_articles(DiskBackend::new(path), config.limit, articles).await?;
        }
        StoreCommand::ObjectStore {
            endpoint,
            bucket,
            key,
            token,
            max_retries,
        } => {
            let backend = ObjectStoreBackend::new(client, &endpoint, bucket, key, token)?;
            let backend = RetryBackend::new(backend, max_retries, Duration::from_secs(1));
            persist_articles(backend, config.limit, articles).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Build the HTTP client shared by the scraper and the object store.
///
/// Both timeouts are always set so a stalled server fails the request with a
/// timeout error, which [`RetryBackend`] treats as transient.
fn http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
}

/// Run one load → add → save cycle against `backend`.
#[instrument(level = "info", skip_all, fields(address = %backend.address(), scraped = articles.len()))]
async fn persist_articles<B: Backend>(
    backend: B,
    limit: usize,
    articles: Vec<Article>,
) -> Result<(), StoreError> {
    let mut store = ArticleStore::new(backend, limit);

    if let Err(e) = store.load().await {
        error!(error = %e, "Failed to load article list");
        return Err(e);
    }
    store.add(articles)?;
    if let Err(e) = store.save().await {
        error!(error = %e, "Failed to save article list");
        return Err(e);
    }

    if let Some(list) = store.list() {
        if list.is_empty() {
            warn!("Stored article list is empty");
        }
        info!(
            stored = list.len(),
            limit = list.limit(),
            newest = ?list.articles().first().map(|a| a.first_seen),
            "Article list updated"
        );
    }
    Ok(())
}
