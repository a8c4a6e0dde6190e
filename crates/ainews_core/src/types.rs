use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Title used when a teaser carries no usable heading.
pub const NO_TITLE: &str = "No Title";

/// The closed set of blogs this workspace knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewsSource {
    OpenAi,
    Groq,
    Anthropic,
    Meta,
    DeepSeek,
    Grok,
}

impl NewsSource {
    pub const ALL: [NewsSource; 6] = [
        NewsSource::Anthropic,
        NewsSource::DeepSeek,
        NewsSource::Groq,
        NewsSource::Grok,
        NewsSource::Meta,
        NewsSource::OpenAi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsSource::OpenAi => "OPENAI",
            NewsSource::Groq => "GROQ",
            NewsSource::Anthropic => "ANTHROPIC",
            NewsSource::Meta => "META",
            NewsSource::DeepSeek => "DEEPSEEK",
            NewsSource::Grok => "GROK",
        }
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        NewsSource::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Scraping(format!("Unknown news source: {}", s)))
    }
}

/// One article as produced by a single extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub source: NewsSource,
    pub title: String,
    pub link: String,
    pub publish_date: Option<DateTime<Utc>>,
    /// `None` when the detail page could not be fetched or had no content container.
    pub content: Option<String>,
}
