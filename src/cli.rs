//! Command-line interface definitions for the journal scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided through environment variables, and any
//! scrape option left unset falls back to the `--config` file and then to the
//! built-in defaults.

use crate::config::ScrapeConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STORE_PATH: &str = "/tmp/articles.json";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Command-line arguments for the journal scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the default journal into /tmp/articles.json
/// journal_scraper
///
/// # Keep at most 200 articles in a local file
/// journal_scraper --limit 200 disk --path ./articles.json
///
/// # Keep the list in an S3-compatible bucket
/// journal_scraper object-store --endpoint http://localhost:9000 --bucket journals --key articles.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML scrape configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Table of contents page to scrape
    #[arg(long, env = "JOURNAL_PAGE_URL")]
    pub page_url: Option<Url>,

    /// Base URL for resolving relative article links
    #[arg(long, env = "JOURNAL_BASE_URL")]
    pub base_url: Option<Url>,

    /// CSS selector matching one link per article
    #[arg(long, env = "JOURNAL_SELECTOR")]
    pub selector: Option<String>,

    /// Fail the run if fewer articles than this are scraped
    #[arg(long)]
    pub min_articles: Option<usize>,

    /// Maximum number of articles to keep (0 keeps everything)
    #[arg(short, long, env = "JOURNAL_MAX_ARTICLES")]
    pub limit: Option<usize>,

    /// Seconds allowed to establish an HTTP connection
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Seconds allowed for a whole HTTP request, including the response body
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Where the article list is persisted (defaults to a local file)
    #[command(subcommand)]
    pub store: Option<StoreCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Keep the article list in a local file
    Disk {
        /// Path of the JSON file
        #[arg(long, env = "JOURNAL_STORE_PATH", default_value = DEFAULT_STORE_PATH)]
        path: PathBuf,
    },
    /// Keep the article list in an S3-compatible object store
    ObjectStore {
        /// Object store endpoint, e.g. https://s3.us-east-1.amazonaws.com
        #[arg(long, env = "JOURNAL_STORE_ENDPOINT")]
        endpoint: Url,

        /// Bucket holding the article list
        #[arg(long, env = "JOURNAL_STORE_BUCKET")]
        bucket: String,

        /// Object key of the article list
        #[arg(long, env = "JOURNAL_STORE_KEY")]
        key: String,

        /// Bearer token sent with every request
        #[arg(long, env = "JOURNAL_STORE_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Retries for transient object store failures
        #[arg(long, default_value_t = 5)]
        max_retries: usize,
    },
}

impl Cli {
    /// Layer the command-line values over `base` (file or defaults).
    pub fn scrape_config(&self, base: ScrapeConfig) -> ScrapeConfig {
        ScrapeConfig {
            page_url: self.page_url.clone().unwrap_or(base.page_url),
            base_url: self.base_url.clone().unwrap_or(base.base_url),
            selector: self.selector.clone().unwrap_or(base.selector),
            min_articles: self.min_articles.unwrap_or(base.min_articles),
            limit: self.limit.unwrap_or(base.limit),
        }
    }

    /// Connect and whole-request timeouts for the shared HTTP client.
    ///
    /// # Returns
    ///
    /// A `(connect, request)` pair of durations.
    pub fn http_timeouts(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.connect_timeout),
            Duration::from_secs(self.request_timeout),
        )
    }

    /// The selected store, defaulting to a local file.
    pub fn store(&self) -> StoreCommand {
        self.store.clone().unwrap_or_else(|| StoreCommand::Disk {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset_cli() -> Cli {
        Cli {
            config: None,
            page_url: None,
            base_url: None,
            selector: None,
            min_articles: None,
            limit: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            store: None,
        }
    }

    #[test]
    fn test_cli_defaults() {
        // Only flags without an env fallback are checked after parsing, so
        // JOURNAL_* variables in the environment cannot change the outcome.
        let cli = Cli::parse_from(["journal_scraper"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.min_articles, None);
        assert_eq!(
            cli.http_timeouts(),
            (Duration::from_secs(10), Duration::from_secs(60))
        );
        assert_eq!(
            cli.store(),
            StoreCommand::Disk {
                path: PathBuf::from("/tmp/articles.json")
            }
        );
    }

    #[test]
    fn test_unset_options_keep_base_config() {
        let base = ScrapeConfig {
            selector: "div.toc a".to_string(),
            limit: 25,
            ..ScrapeConfig::default()
        };
        assert_eq!(unset_cli().scrape_config(base.clone()), base);
    }

    #[test]
    fn test_cli_overrides_base_config() {
        let cli = Cli::parse_from([
            "journal_scraper",
            "--page-url",
            "https://journals.example.org/toc",
            "--selector",
            "ul.toc a",
            "-l",
            "0",
        ]);
        let base = ScrapeConfig {
            min_articles: 3,
            ..ScrapeConfig::default()
        };

        let config = cli.scrape_config(base);
        assert_eq!(config.page_url.as_str(), "https://journals.example.org/toc");
        assert_eq!(config.selector, "ul.toc a");
        assert_eq!(config.limit, 0);
        assert_eq!(config.min_articles, 3);
    }

    #[test]
    fn test_cli_timeouts() {
        let cli = Cli::parse_from([
            "journal_scraper",
            "--connect-timeout",
            "2",
            "--request-timeout",
            "15",
        ]);
        assert_eq!(
            cli.http_timeouts(),
            (Duration::from_secs(2), Duration::from_secs(15))
        );
    }

    #[test]
    fn test_cli_disk_store() {
        let cli = Cli::parse_from(["journal_scraper", "disk", "--path", "./articles.json"]);

        assert_eq!(
            cli.store(),
            StoreCommand::Disk {
                path: PathBuf::from("./articles.json")
            }
        );
    }

    #[test]
    fn test_cli_object_store() {
        let cli = Cli::parse_from([
            "journal_scraper",
            "--limit",
            "200",
            "object-store",
            "--endpoint",
            "http://localhost:9000",
            "--bucket",
            "journals",
            "--key",
            "articles.json",
        ]);

        assert_eq!(cli.limit, Some(200));
        match cli.store() {
            StoreCommand::ObjectStore {
                endpoint,
                bucket,
                key,
                max_retries,
                ..
            } => {
                assert_eq!(endpoint.as_str(), "http://localhost:9000/");
                assert_eq!(bucket, "journals");
                assert_eq!(key, "articles.json");
                assert_eq!(max_retries, 5);
            }
            other => panic!("expected object store, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_relative_page_url() {
        assert!(Cli::try_parse_from(["journal_scraper", "--page-url", "/toc"]).is_err());
    }
}
