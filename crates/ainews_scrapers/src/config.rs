use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Scheduling and transport policy for one scrape sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Pause between two article-detail fetches of the same source.
    pub per_article_delay: Duration,
    /// Pause before every source except the first.
    pub per_source_delay: Duration,
    /// Connect + read timeout of each HTTP request.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            per_article_delay: Duration::from_secs(1),
            per_source_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// No pauses at all; meant for tests and replaying saved pages.
    pub fn without_delays() -> Self {
        Self {
            per_article_delay: Duration::ZERO,
            per_source_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_delays(mut self, per_article: Duration, per_source: Duration) -> Self {
        self.per_article_delay = per_article;
        self.per_source_delay = per_source;
        self
    }
}
