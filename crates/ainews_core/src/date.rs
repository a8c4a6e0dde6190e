//! Free-form publish-date parsing.
//!
//! Blog listings print dates however their designers liked: `March 3, 2024`,
//! `Mar 3rd 2024`, `03/04/2024`, ISO stamps in `<time>` tags. Everything
//! resolves to a UTC timestamp; naive values are taken as UTC midnight.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::{Error, Result};

lazy_static! {
    static ref ORDINAL: Regex = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A %B %d %Y",
    "%a %b %d %Y",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const MONTH_FIRST: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

// `%Y` takes any digit count, so "March 2024" reads as day 20 of year 24.
fn has_full_year(date: NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    /// Read ambiguous numeric dates such as `03/04/2024` as day/month.
    pub day_first: bool,
}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day_first() -> Self {
        Self { day_first: true }
    }

    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(Error::DateParse(text.to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Some(naive) = DATETIME_FORMATS
            .iter()
            .filter_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .find(|naive| has_full_year(naive.date()))
        {
            return Ok(naive.and_utc());
        }

        let cleaned = Self::clean(raw);
        let numeric = if self.day_first { DAY_FIRST } else { MONTH_FIRST };
        NAMED_MONTH_FORMATS
            .iter()
            .chain(ISO_DATE_FORMATS)
            .chain(numeric)
            .filter_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            .find(|date| has_full_year(*date))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| Error::DateParse(text.to_string()))
    }

    /// Like [`parse`](Self::parse) but maps any failure to `None`.
    pub fn normalize(&self, text: &str) -> Option<DateTime<Utc>> {
        match self.parse(text) {
            Ok(dt) => Some(dt),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unparseable date");
                None
            }
        }
    }

    // "Mar. 3rd, 2024" -> "Mar 3 2024"
    fn clean(raw: &str) -> String {
        let without_ordinals = ORDINAL.replace_all(raw, "$1");
        let spaced: String = without_ordinals
            .chars()
            .map(|c| if c == ',' { ' ' } else { c })
            .collect();
        let spaced = spaced
            .split_whitespace()
            .map(|word| word.strip_suffix('.').filter(|w| w.chars().all(char::is_alphabetic)).unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" ");
        WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
    }
}
