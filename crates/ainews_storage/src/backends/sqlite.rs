use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ainews_core::{ArticleStorage, Error, NewsSource, Result, StoredArticle};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "articles.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL,
        title TEXT NOT NULL,
        link TEXT NOT NULL UNIQUE,
        publish_date TEXT,
        content TEXT NOT NULL,
        metadata TEXT NOT NULL DEFAULT '{}',
        is_active INTEGER NOT NULL DEFAULT 1,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_source_date ON articles (source, publish_date)",
    // Add future migrations here
];

fn db_err(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

// Fixed-width UTC so that TEXT comparison orders chronologically.
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse stored date {:?}: {}", raw, e)))
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./articles.db"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        match url {
            Some(url) if url.starts_with("sqlite:") => Self::new_with_url(url).await,
            Some(path) => Self::new_with_path(Path::new(path)).await,
            None => Self::new_with_path(Path::new(DEFAULT_DB_PATH)).await,
        }
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::open(options, db_path.to_path_buf()).await
    }

    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err("Invalid SQLite URL"))?
            .create_if_missing(true);
        let db_path = options.clone().get_filename().to_path_buf();
        Self::open(options, db_path).await
    }

    async fn open(options: SqliteConnectOptions, db_path: PathBuf) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(db_err("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::debug!(path = %db_path.display(), "SQLite storage ready");
        Ok(Self {
            pool: Arc::new(pool),
            db_path,
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    fn article_from_row(row: &SqliteRow) -> Result<StoredArticle> {
        let id: String = row.try_get("id").map_err(db_err("Missing id"))?;
        let source: String = row.try_get("source").map_err(db_err("Missing source"))?;
        let publish_date: Option<String> = row.try_get("publish_date").map_err(db_err("Missing publish_date"))?;
        let metadata: String = row.try_get("metadata").map_err(db_err("Missing metadata"))?;
        let created_at: String = row.try_get("created_at").map_err(db_err("Missing created_at"))?;
        let updated_at: String = row.try_get("updated_at").map_err(db_err("Missing updated_at"))?;
        let version: i64 = row.try_get("version").map_err(db_err("Missing version"))?;

        Ok(StoredArticle {
            id: Uuid::parse_str(&id).map_err(|e| Error::Database(format!("Bad article id {:?}: {}", id, e)))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            version: u32::try_from(version).map_err(|e| Error::Database(format!("Bad version {}: {}", version, e)))?,
            metadata: serde_json::from_str(&metadata)?,
            is_active: row.try_get("is_active").map_err(db_err("Missing is_active"))?,
            source: source.parse::<NewsSource>()?,
            title: row.try_get("title").map_err(db_err("Missing title"))?,
            link: row.try_get("link").map_err(db_err("Missing link"))?,
            publish_date: publish_date.as_deref().map(parse_timestamp).transpose()?,
            content: row.try_get("content").map_err(db_err("Missing content"))?,
        })
    }

    fn articles_from_rows(rows: &[SqliteRow]) -> Result<Vec<StoredArticle>> {
        rows.iter().map(Self::article_from_row).collect()
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn find_by_link(&self, link: &str) -> Result<Option<StoredArticle>> {
        let row = sqlx::query("SELECT * FROM articles WHERE link = ? LIMIT 1")
            .bind(link)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_err("Failed to look up article by link"))?;
        row.as_ref().map(Self::article_from_row).transpose()
    }

    async fn insert(&self, article: &StoredArticle) -> Result<StoredArticle> {
        sqlx::query(
            r#"
            INSERT INTO articles
            (id, source, title, link, publish_date, content, metadata, is_active, version, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(article.source.as_str())
        .bind(&article.title)
        .bind(&article.link)
        .bind(article.publish_date.as_ref().map(timestamp))
        .bind(&article.content)
        .bind(serde_json::to_string(&article.metadata)?)
        .bind(article.is_active)
        .bind(i64::from(article.version))
        .bind(timestamp(&article.created_at))
        .bind(timestamp(&article.updated_at))
        .execute(&*self.pool)
        .await
        .map_err(db_err("Failed to store article"))?;

        Ok(article.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredArticle>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_err("Failed to get article"))?;
        row.as_ref().map(Self::article_from_row).transpose()
    }

    async fn get_by_source(&self, source: NewsSource, limit: usize) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE source = ?
            ORDER BY publish_date IS NULL, publish_date DESC
            LIMIT ?
            "#,
        )
        .bind(source.as_str())
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_err("Failed to get articles by source"))?;

        Self::articles_from_rows(&rows)
    }

    async fn get_recent(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<StoredArticle>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE publish_date IS NOT NULL AND publish_date >= ?
            ORDER BY publish_date DESC
            LIMIT ?
            "#,
        )
        .bind(timestamp(&since))
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_err("Failed to get recent articles"))?;

        Self::articles_from_rows(&rows)
    }

    async fn update(&self, article: &StoredArticle) -> Result<Option<StoredArticle>> {
        let mut updated = article.clone();
        updated.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET source = ?, title = ?, link = ?, publish_date = ?, content = ?,
                metadata = ?, is_active = ?, version = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(updated.source.as_str())
        .bind(&updated.title)
        .bind(&updated.link)
        .bind(updated.publish_date.as_ref().map(timestamp))
        .bind(&updated.content)
        .bind(serde_json::to_string(&updated.metadata)?)
        .bind(updated.is_active)
        .bind(i64::from(updated.version))
        .bind(timestamp(&updated.updated_at))
        .bind(updated.id.to_string())
        .execute(&*self.pool)
        .await
        .map_err(db_err("Failed to update article"))?;

        Ok((result.rows_affected() > 0).then_some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(db_err("Failed to delete article"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(db_err("Failed to count articles"))?;
        Ok(count as usize)
    }
}
