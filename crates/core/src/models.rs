//! Mirrored records.
//!
//! Ids are the remote-assigned identifiers; timestamps are the remote
//! `createdDateTime` / `lastModifiedDateTime` values, never local sync time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A notebook section. Replaced wholesale on every section sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Section {
    pub id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_default: bool,
}

/// A page with its rewritten body. Upserted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Page {
    pub id: String,
    pub section_id: String,
    pub title: String,
    pub cover: String,
    pub summary: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: a page without its body, with the owning section's name.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageSummary {
    pub id: String,
    pub section_id: String,
    pub section_name: Option<String>,
    pub title: String,
    pub cover: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of a listing plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paged<T> {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self { items: Vec::new(), total: 0, page, page_size }
    }

    /// Number of pages needed to show `total` rows.
    pub fn max_page(&self) -> u64 {
        if self.page_size == 0 { 0 } else { self.total.div_ceil(u64::from(self.page_size)) }
    }
}

/// Render a timestamp in the fixed-width form used for storage and remote filters.
///
/// The fraction is always nine digits so lexical order matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored or remote RFC 3339 timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}
