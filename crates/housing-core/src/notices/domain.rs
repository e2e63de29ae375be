use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single scraped announcement from an official housing channel.
///
/// The `url` is the record's identity: the store never keeps two notices with
/// the same URL, and a stored notice is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub url: String,
    pub publish_date: NaiveDate,
    pub source_name: String,
    pub fetched_at: DateTime<Utc>,
}
