//! Table-of-contents scrapers that turn a listing page into [`Article`]s.
//!
//! Scraping follows a fixed pattern:
//!
//! 1. **Fetching**: Download the configured listing page
//! 2. **Extraction**: Run an extractor over every element matching the
//!    configured selector, skipping elements that do not yield an article
//! 3. **Sanity check**: Refuse a batch that is implausibly small, since that
//!    almost always means the page markup changed
//!
//! # Supported Sources
//!
//! | Source | Module | Markup |
//! |--------|--------|--------|
//! | Wiley Online Library | [`wiley`] | `a.issue-item__title` links with an `h2`/`h3` title |
//!
//! [`Article`]: crate::models::Article

pub mod wiley;

use crate::models::Article;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch listing page: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid article selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("scraped only {found} articles, expected at least {minimum}; the page markup may have changed")]
    TooFewArticles { found: usize, minimum: usize },
}

/// Reject a scraped batch with fewer than `minimum` articles.
pub fn ensure_plausible(articles: &[Article], minimum: usize) -> Result<(), ScrapeError> {
    if articles.len() < minimum {
        return Err(ScrapeError::TooFewArticles {
            found: articles.len(),
            minimum,
        });
    }
    Ok(())
}
