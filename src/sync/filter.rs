//! Filename filter deciding which remote log files must be fetched.
//!
//! A file is fetched when its name starts with the configured prefix and the
//! first embedded `YYYY-MM-DD` token is on or after the host's watermark.
//! Files dated exactly on the watermark are fetched again on every run.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default log file prefix.
pub const DEFAULT_PREFIX: &str = "laravel";

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date token pattern is valid"));

/// Why a file was not accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    PrefixMismatch,
    /// Prefixed but carries no `YYYY-MM-DD` token. Reported as a diagnostic.
    NoDateToken,
    BeforeWatermark { date: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    Skip(SkipReason),
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, FilterDecision::Accept)
    }
}

#[derive(Clone, Debug)]
pub struct SyncFilter {
    prefix: String,
}

impl Default for SyncFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl SyncFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn evaluate(&self, filename: &str, last_sync: Option<NaiveDate>) -> FilterDecision {
        if !filename.starts_with(&self.prefix) {
            return FilterDecision::Skip(SkipReason::PrefixMismatch);
        }
        let Some(token) = date_token(filename) else {
            return FilterDecision::Skip(SkipReason::NoDateToken);
        };
        match last_sync {
            None => FilterDecision::Accept,
            // ISO dates order lexicographically
            Some(watermark) if token >= watermark.format("%Y-%m-%d").to_string().as_str() => {
                FilterDecision::Accept
            }
            Some(_) => FilterDecision::Skip(SkipReason::BeforeWatermark {
                date: token.to_string(),
            }),
        }
    }

    pub fn accept(&self, filename: &str, last_sync: Option<NaiveDate>) -> bool {
        self.evaluate(filename, last_sync).is_accept()
    }
}

/// First `YYYY-MM-DD` shaped substring of `filename`.
pub fn date_token(filename: &str) -> Option<&str> {
    DATE_TOKEN.find(filename).map(|m| m.as_str())
}

/// Shorthand for [`SyncFilter::accept`] with the default prefix.
pub fn accept(filename: &str, last_sync: Option<NaiveDate>) -> bool {
    SyncFilter::default().accept(filename, last_sync)
}
