use std::cmp::Reverse;
use std::sync::Arc;

use ainews_core::{ArticleStorage, NewsSource, Result, StoredArticle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<StoredArticle>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_link(&self, link: &str) -> Option<StoredArticle> {
        self.articles.iter().find(|a| a.link == link).cloned()
    }

    pub fn insert(&mut self, article: &StoredArticle) -> StoredArticle {
        self.articles.push(article.clone());
        article.clone()
    }

    pub fn update(&mut self, article: &StoredArticle) -> Option<StoredArticle> {
        let existing = self.articles.iter_mut().find(|a| a.id == article.id)?;
        *existing = article.clone();
        existing.updated_at = Utc::now();
        Some(existing.clone())
    }

    fn newest_first<'a>(articles: impl Iterator<Item = &'a StoredArticle>, limit: usize) -> Vec<StoredArticle> {
        let mut articles = articles.cloned().collect::<Vec<_>>();
        articles.sort_by_key(|a| Reverse(a.publish_date));
        articles.truncate(limit);
        articles
    }
}

/// Process-local storage; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn find_by_link(&self, link: &str) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find_by_link(link))
    }

    async fn insert(&self, article: &StoredArticle) -> Result<StoredArticle> {
        let mut store = self.store.write().await;
        if store.find_by_link(&article.link).is_some() {
            return Err(ainews_core::Error::Storage(format!("Duplicate link: {}", article.link)));
        }
        Ok(store.insert(article))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredArticle>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn get_by_source(&self, source: NewsSource, limit: usize) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().await;
        Ok(MemoryStore::newest_first(
            store.articles.iter().filter(|a| a.source == source),
            limit,
        ))
    }

    async fn get_recent(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().await;
        Ok(MemoryStore::newest_first(
            store.articles.iter().filter(|a| a.publish_date.is_some_and(|d| d >= since)),
            limit,
        ))
    }

    async fn update(&self, article: &StoredArticle) -> Result<Option<StoredArticle>> {
        Ok(self.store.write().await.update(article))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut store = self.store.write().await;
        let before = store.articles.len();
        store.articles.retain(|a| a.id != id);
        Ok(store.articles.len() != before)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.articles.len())
    }
}
