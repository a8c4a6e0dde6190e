use std::sync::Arc;

use ainews_core::{ArticleStorage, Error, Result};
use async_trait::async_trait;

pub mod backends;
pub mod ingest;

pub use backends::*;
pub use ingest::{IngestReport, Ingestor};

#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    fn get_error_message() -> &'static str;

    /// Open the backend at `url`, or at its default location when `None`.
    async fn connect(url: Option<&str>) -> Result<Self>;
}

/// Build the storage backend named `kind` ("memory" or "sqlite").
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    match kind.to_ascii_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::connect(url).await?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = SQLiteStorage::connect(url).await.map_err(|e| {
                tracing::error!(error = %e, "{}", SQLiteStorage::get_error_message());
                e
            })?;
            Ok(Arc::new(storage))
        }
        other => Err(Error::Storage(format!("Unsupported storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::ingest::{IngestReport, Ingestor};
    pub use super::StorageBackend;
}
