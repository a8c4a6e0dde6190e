use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::types::{ArticleRecord, NewsSource};
use crate::{Error, Result};

/// An article as it lives in storage: the extracted record plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArticle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub is_active: bool,

    pub source: NewsSource,
    pub title: String,
    pub link: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub content: String,
}

impl StoredArticle {
    /// Validates `record` and stamps a fresh identity, timestamps and version 1.
    ///
    /// The link must be an absolute `http`/`https` URL and the title must not
    /// be empty. Missing content is stored as an empty string.
    pub fn from_record(record: &ArticleRecord) -> Result<Self> {
        let link = Url::parse(&record.link)
            .map_err(|e| Error::Validation(format!("link {:?} is not an absolute URL: {}", record.link, e)))?;
        if !matches!(link.scheme(), "http" | "https") {
            return Err(Error::Validation(format!(
                "link {:?} has unsupported scheme {}",
                record.link,
                link.scheme()
            )));
        }
        if record.title.trim().is_empty() {
            return Err(Error::Validation(format!("article {} has an empty title", record.link)));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            version: 1,
            metadata: HashMap::new(),
            is_active: true,
            source: record.source,
            title: record.title.clone(),
            link: record.link.clone(),
            publish_date: record.publish_date,
            content: record.content.clone().unwrap_or_default(),
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn increment_version(&mut self) {
        self.version += 1;
        self.touch();
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    /// Returns `false` when the key was not present.
    pub fn remove_metadata(&mut self, key: &str) -> bool {
        if self.metadata.remove(key).is_some() {
            self.touch();
            true
        } else {
            false
        }
    }

    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn restore(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn summary(&self) -> String {
        let date = self
            .publish_date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "Article: {}\nSource: {}\nDate: {}\nURL: {}\nStatus: {}",
            self.title,
            self.source,
            date,
            self.link,
            if self.is_active { "Active" } else { "Inactive" }
        )
    }
}
