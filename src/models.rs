//! Data models for scraped journal articles and the persisted article list.
//!
//! This module defines the two value types the rest of the application is
//! built around:
//! - [`Article`]: One discovered article (title, canonical URL, first-seen time)
//! - [`ArticleList`]: The deduplicated, newest-first, size-bounded collection
//!   that gets persisted between runs
//!
//! # Wire Shape
//!
//! An [`ArticleList`] serializes to a single-field JSON document:
//!
//! ```text
//! {"articles":[{"title":"…","url":"https://…","first_seen":"2021-10-15T00:00:00Z"}]}
//! ```
//!
//! URLs are written as their canonical absolute string and timestamps as
//! RFC 3339 UTC strings. The list's `limit` is configuration, not data, and is
//! never written.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single article discovered on the journal's table of contents.
///
/// Two articles are the same article iff their URLs serialize to the same
/// string. The title plays no part in deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// The article title as shown on the listing page.
    pub title: String,
    /// Absolute URL of the article, used as the deduplication key.
    pub url: Url,
    /// When this article was first scraped. Never updated by later merges.
    pub first_seen: DateTime<Utc>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: Url, first_seen: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            url,
            first_seen,
        }
    }
}

/// The persisted, in-memory list of known articles.
///
/// After any [`ArticleList::merge`] the list holds no two articles with the
/// same URL, is sorted newest first by `first_seen`, and holds at most
/// `limit` articles (a `limit` of 0 means unbounded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleList {
    articles: Vec<Article>,
    #[serde(skip)]
    limit: usize,
}

impl ArticleList {
    /// Create an empty list that will retain at most `limit` articles.
    pub fn new(limit: usize) -> Self {
        Self {
            articles: Vec::new(),
            limit,
        }
    }

    /// Replace the limit of a freshly decoded list.
    ///
    /// The limit is not part of the wire shape, so a decoded list starts out
    /// unbounded until the owning store hands it the configured value.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Merge newly scraped articles into the list.
    ///
    /// See [`merge`] for the exact policy. The result replaces the current
    /// contents wholesale.
    pub fn merge(&mut self, new_articles: Vec<Article>) {
        let existing = std::mem::take(&mut self.articles);
        self.articles = merge(existing, new_articles, self.limit);
    }
}

/// Combine `existing` and `incoming` into a deduplicated, newest-first list of
/// at most `limit` articles (`limit == 0` keeps everything).
///
/// # Policy
///
/// 1. `existing` is followed by `incoming`, each in its given order.
/// 2. The first article seen for a URL wins; later duplicates are dropped. An
///    article that is already known therefore keeps its stored title and
///    `first_seen` when it is scraped again.
/// 3. The survivors are sorted descending by `first_seen`.
/// 4. Only then is the list truncated to `limit`, so the newest articles
///    always survive regardless of where they appeared in the batch.
///
/// Articles with equal `first_seen` keep their relative order, but callers
/// must not rely on any particular tie order.
///
/// # Arguments
///
/// * `existing` - The articles already stored
/// * `incoming` - A freshly scraped batch
/// * `limit` - Maximum length of the result, or `0` for no limit
///
/// # Returns
///
/// The merged list, newest first, never longer than `limit`.
pub fn merge(existing: Vec<Article>, incoming: Vec<Article>, limit: usize) -> Vec<Article> {
    let mut merged = existing
        .into_iter()
        .chain(incoming)
        .unique_by(|article| article.url.as_str().to_owned())
        .collect::<Vec<Article>>();

    merged.sort_by(|a, b| b.first_seen.cmp(&a.first_seen));

    if limit > 0 {
        merged.truncate(limit);
    }
    merged
}
