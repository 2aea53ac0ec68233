//! Wiley Online Library table-of-contents scraper.
//!
//! Each article on a Wiley issue page is an `<a class="issue-item__title">`
//! whose `href` is relative to the site root and whose title sits in a child
//! heading. Some pages use `<h2>` for the title and others `<h3>`.

use super::ScrapeError;
use crate::config::ScrapeConfig;
use crate::models::Article;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Title sources, in priority order.
static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h2", "h3"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Why a single element did not yield an [`Article`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("element has no or empty href value")]
    MissingHref,
    #[error("element href could not be resolved: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no article title could be derived from element")]
    MissingTitle,
}

/// Turn one article link element into an [`Article`].
///
/// The `href` is resolved against `base_url`. The title is the text of the
/// element's `h2` children, or failing that its `h3` children, with
/// whitespace collapsed.
///
/// # Arguments
///
/// * `element` - A link element matched by the listing selector
/// * `base_url` - Base for resolving relative `href` values
/// * `observed_at` - Becomes the article's `first_seen`
///
/// # Returns
///
/// The article, or the [`ExtractionError`] explaining why the element was
/// unusable.
pub fn element_to_article(
    element: ElementRef<'_>,
    base_url: &Url,
    observed_at: DateTime<Utc>,
) -> Result<Article, ExtractionError> {
    let href = element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ExtractionError::MissingHref)?;
    let url = base_url.join(href)?;

    let title = TITLE_SELECTORS
        .iter()
        .map(|selector| child_text(element, selector))
        .find(|text| !text.is_empty())
        .ok_or(ExtractionError::MissingTitle)?;

    Ok(Article::new(title, url, observed_at))
}

fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    let text = element
        .select(selector)
        .flat_map(|child| child.text())
        .collect::<String>();
    collapse_whitespace(&text)
}

/// Extract every article from a listing page's HTML.
///
/// Elements that fail extraction are logged and skipped; one bad element
/// never aborts the batch.
pub fn extract_articles(
    html: &str,
    base_url: &Url,
    selector: &str,
    observed_at: DateTime<Utc>,
) -> Result<Vec<Article>, ScrapeError> {
    let item_selector = Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);

    let mut articles = Vec::new();
    let mut skipped = 0usize;
    for element in document.select(&item_selector) {
        match element_to_article(element, base_url, observed_at) {
            Ok(article) => articles.push(article),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, html = %element.html(), "Skipping element");
            }
        }
    }

    debug!(extracted = articles.len(), skipped, "Extracted articles");
    Ok(articles)
}

/// Fetch the configured listing page and extract its articles.
///
/// # Returns
///
/// Every article that could be extracted, all stamped with `observed_at`, or
/// an error if the page could not be fetched or the selector is invalid.
#[instrument(level = "info", skip_all, fields(page_url = %config.page_url))]
pub async fn index_articles(
    client: &Client,
    config: &ScrapeConfig,
    observed_at: DateTime<Utc>,
) -> Result<Vec<Article>, ScrapeError> {
    let html = client
        .get(config.page_url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!(bytes = html.len(), "Fetched listing page");

    let articles = extract_articles(&html, &config.base_url, &config.selector, observed_at)?;
    info!(count = articles.len(), "Indexed journal articles");
    Ok(articles)
}
