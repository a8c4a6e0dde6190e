pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod manager;
pub mod scrapers;

#[cfg(test)]
mod test_utils;

pub use cli::{handle_command, ScraperCommands};
pub use config::ScrapeConfig;
pub use fetch::HttpFetcher;
pub use logging::{init_logging, Logger};
pub use manager::{ScrapeOutcome, ScrapeStats, ScraperManager, ScraperStatus, SweepReport};
pub use scrapers::{get_scraper_factories, Scraper};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::{ScrapeConfig, ScraperManager};
    pub use ainews_core::{ArticleRecord, Error, NewsSource, Result};
}
