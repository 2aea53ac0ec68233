//! The article store: an [`ArticleList`] bound to a persistence [`Backend`].
//!
//! Code using [`ArticleStore`] calls [`ArticleStore::load`], then
//! [`ArticleStore::add`] any number of times, then [`ArticleStore::save`].
//! Only `load` and `save` touch the backend; `add` is purely in memory.

use crate::backends::{Backend, BackendError};
use crate::models::{Article, ArticleList};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to decode persisted article list: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode article list: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("article store used before load()")]
    NotLoaded,
}

/// An [`ArticleList`] persisted through a [`Backend`].
#[derive(Debug)]
pub struct ArticleStore<B> {
    backend: B,
    limit: usize,
    list: Option<ArticleList>,
}

impl<B> ArticleStore<B>
where
    B: Backend,
{
    /// Create a store that keeps at most `limit` articles (0 = unbounded).
    ///
    /// Nothing is read until [`ArticleStore::load`] is called.
    ///
    /// # Arguments
    ///
    /// * `backend` - Where the encoded list is read from and written to
    /// * `limit` - Maximum number of articles retained after every merge
    pub fn new(backend: B, limit: usize) -> Self {
        Self {
            backend,
            limit,
            list: None,
        }
    }

    /// The loaded article list, or `None` before [`ArticleStore::load`].
    pub fn list(&self) -> Option<&ArticleList> {
        self.list.as_ref()
    }

    /// Read the persisted list from the backend.
    ///
    /// A blob that does not exist yet, or is empty, yields an empty list. Any
    /// other blob must decode, and the decoded list is normalized to this
    /// store's limit. Calling `load` again discards unsaved additions.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the list is held in memory. Backend failures surface as
    /// [`StoreError::Backend`] and malformed blobs as [`StoreError::Decode`];
    /// neither touches the persisted data.
    #[instrument(level = "info", skip_all, fields(address = %self.backend.address(), limit = self.limit))]
    pub async fn load(&mut self) -> Result<(), StoreError> {
        let list = match self.backend.read().await? {
            Some(bytes) if !bytes.is_empty() => {
                let mut list = serde_json::from_slice::<ArticleList>(&bytes)
                    .map_err(StoreError::Decode)?
                    .with_limit(self.limit);
                list.merge(Vec::new());
                list
            }
            Some(_) => {
                debug!("Persisted article list is empty");
                ArticleList::new(self.limit)
            }
            None => {
                debug!("No persisted article list yet");
                ArticleList::new(self.limit)
            }
        };

        info!(count = list.len(), "Loaded article list");
        self.list = Some(list);
        Ok(())
    }

    /// Merge `articles` into the loaded list.
    ///
    /// Returns [`StoreError::NotLoaded`] if [`ArticleStore::load`] has not
    /// succeeded yet.
    pub fn add(&mut self, articles: Vec<Article>) -> Result<(), StoreError> {
        let list = self.list.as_mut().ok_or(StoreError::NotLoaded)?;
        let before = list.len();
        let incoming = articles.len();
        list.merge(articles);
        debug!(before, incoming, after = list.len(), "Merged articles");
        Ok(())
    }

    /// Encode the list and overwrite the backend's blob with it.
    ///
    /// # Returns
    ///
    /// [`StoreError::NotLoaded`] before a successful load, otherwise the
    /// outcome of the backend write.
    #[instrument(level = "info", skip_all, fields(address = %self.backend.address()))]
    pub async fn save(&self) -> Result<(), StoreError> {
        let list = self.list.as_ref().ok_or(StoreError::NotLoaded)?;
        let bytes = serde_json::to_vec(list).map_err(StoreError::Encode)?;
        self.backend.write(bytes).await?;
        info!(count = list.len(), "Saved article list");
        Ok(())
    }
}
