pub mod date;
pub mod error;
pub mod fetch;
pub mod models;
pub mod storage;
pub mod types;

pub use date::DateNormalizer;
pub use error::{Error, Result};
pub use fetch::{Page, PageFetcher};
pub use models::StoredArticle;
pub use storage::ArticleStorage;
pub use types::{ArticleRecord, NewsSource, NO_TITLE};
