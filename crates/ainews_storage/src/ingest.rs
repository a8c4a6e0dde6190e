//! Deduplicating ingestion of freshly extracted articles.
//!
//! The canonical link is the natural key: a record whose link is already
//! stored is skipped, never overwritten. Every record is handled on its own,
//! so a bad record is logged and counted without stopping the batch.

use std::sync::Arc;

use ainews_core::{ArticleRecord, ArticleStorage, Result, StoredArticle};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Inserted(StoredArticle),
    Duplicate,
}

pub struct Ingestor {
    storage: Arc<dyn ArticleStorage>,
}

impl Ingestor {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        &self.storage
    }

    /// Store the records whose links are not yet known.
    pub async fn ingest(&self, records: &[ArticleRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        for record in records {
            match self.ingest_one(record).await {
                Ok(IngestOutcome::Inserted(stored)) => {
                    debug!(link = %stored.link, id = %stored.id, "stored new article");
                    report.inserted += 1;
                }
                Ok(IngestOutcome::Duplicate) => {
                    debug!(link = %record.link, "article already stored, skipping");
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(link = %record.link, error = %e, "failed to ingest article");
                    report.failed += 1;
                }
            }
        }

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "ingestion finished"
        );
        report
    }

    pub async fn ingest_one(&self, record: &ArticleRecord) -> Result<IngestOutcome> {
        if self.storage.find_by_link(&record.link).await?.is_some() {
            return Ok(IngestOutcome::Duplicate);
        }
        let article = StoredArticle::from_record(record)?;
        let stored = self.storage.insert(&article).await?;
        Ok(IngestOutcome::Inserted(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use ainews_core::{Error, NewsSource};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn record(link: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            source: NewsSource::Meta,
            title: title.to_string(),
            link: link.to_string(),
            publish_date: None,
            content: Some("Llama".to_string()),
        }
    }

    fn ingestor() -> (Ingestor, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (Ingestor::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let (ingestor, storage) = ingestor();
        let records = vec![
            record("https://ai.meta.com/blog/a/", "A"),
            record("https://ai.meta.com/blog/b/", "B"),
        ];

        let first = ingestor.ingest(&records).await;
        assert_eq!(first, IngestReport { inserted: 2, skipped: 0, failed: 0 });

        let second = ingestor.ingest(&records).await;
        assert_eq!(second, IngestReport { inserted: 0, skipped: 2, failed: 0 });
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_existing_link_is_not_overwritten() {
        let (ingestor, storage) = ingestor();
        ingestor.ingest(&[record("https://ai.meta.com/blog/a/", "Original")]).await;
        let before = storage.find_by_link("https://ai.meta.com/blog/a/").await.unwrap().unwrap();

        let report = ingestor.ingest(&[record("https://ai.meta.com/blog/a/", "Rewritten")]).await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.inserted, 0);

        let after = storage.find_by_link("https://ai.meta.com/blog/a/").await.unwrap().unwrap();
        assert_eq!(after, before);
        assert_eq!(after.title, "Original");
    }

    #[tokio::test]
    async fn test_duplicates_within_one_batch() {
        let (ingestor, _) = ingestor();
        let report = ingestor
            .ingest(&[
                record("https://ai.meta.com/blog/a/", "A"),
                record("https://ai.meta.com/blog/a/", "A again"),
            ])
            .await;
        assert_eq!(report, IngestReport { inserted: 1, skipped: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_invalid_record_does_not_stop_ingestion() {
        let (ingestor, storage) = ingestor();
        let report = ingestor
            .ingest(&[
                record("https://ai.meta.com/blog/a/", "A"),
                record("/blog/relative", "Broken"),
                record("https://ai.meta.com/blog/c/", "C"),
            ])
            .await;

        assert_eq!(report, IngestReport { inserted: 2, skipped: 0, failed: 1 });
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_content_is_stored_empty() {
        let (ingestor, storage) = ingestor();
        let mut no_content = record("https://ai.meta.com/blog/a/", "A");
        no_content.content = None;

        let outcome = ingestor.ingest_one(&no_content).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Inserted(ref a) if a.content.is_empty()));
        let stored = storage.find_by_link("https://ai.meta.com/blog/a/").await.unwrap().unwrap();
        assert_eq!(stored.content, "");
        assert_eq!(stored.version, 1);
    }

    struct FlakyStorage {
        inner: MemoryStorage,
        poisoned_link: &'static str,
    }

    #[async_trait]
    impl ArticleStorage for FlakyStorage {
        async fn find_by_link(&self, link: &str) -> ainews_core::Result<Option<StoredArticle>> {
            if link == self.poisoned_link {
                return Err(Error::Storage("connection reset".to_string()));
            }
            self.inner.find_by_link(link).await
        }

        async fn insert(&self, article: &StoredArticle) -> ainews_core::Result<StoredArticle> {
            self.inner.insert(article).await
        }

        async fn get_by_id(&self, id: Uuid) -> ainews_core::Result<Option<StoredArticle>> {
            self.inner.get_by_id(id).await
        }

        async fn get_by_source(&self, source: NewsSource, limit: usize) -> ainews_core::Result<Vec<StoredArticle>> {
            self.inner.get_by_source(source, limit).await
        }

        async fn get_recent(&self, since: DateTime<Utc>, limit: usize) -> ainews_core::Result<Vec<StoredArticle>> {
            self.inner.get_recent(since, limit).await
        }

        async fn update(&self, article: &StoredArticle) -> ainews_core::Result<Option<StoredArticle>> {
            self.inner.update(article).await
        }

        async fn delete(&self, id: Uuid) -> ainews_core::Result<bool> {
            self.inner.delete(id).await
        }

        async fn count(&self) -> ainews_core::Result<usize> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn test_storage_error_is_contained() {
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            poisoned_link: "https://ai.meta.com/blog/b/",
        });
        let ingestor = Ingestor::new(storage.clone());

        let report = ingestor
            .ingest(&[
                record("https://ai.meta.com/blog/a/", "A"),
                record("https://ai.meta.com/blog/b/", "B"),
                record("https://ai.meta.com/blog/c/", "C"),
            ])
            .await;
        assert_eq!(report, IngestReport { inserted: 2, skipped: 0, failed: 1 });
        assert_eq!(storage.count().await.unwrap(), 2);
    }
}
