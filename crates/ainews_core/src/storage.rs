use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::StoredArticle;
use crate::types::NewsSource;
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Find the article whose canonical link equals `link` exactly
    async fn find_by_link(&self, link: &str) -> Result<Option<StoredArticle>>;

    /// Persist a new article
    async fn insert(&self, article: &StoredArticle) -> Result<StoredArticle>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredArticle>>;

    /// Articles from one source, newest publish date first
    async fn get_by_source(&self, source: NewsSource, limit: usize) -> Result<Vec<StoredArticle>>;

    /// Articles published at or after `since`, newest first
    async fn get_recent(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<StoredArticle>>;

    /// Overwrite an existing article, refreshing `updated_at`.
    /// Returns `None` when no article has that id.
    async fn update(&self, article: &StoredArticle) -> Result<Option<StoredArticle>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}
