//! Query parameters for the paginated pages endpoint.

use chrono::{DateTime, Utc};
use onesync_core::models::format_timestamp;

/// One batch request against a section's pages, newest modification first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Batch size (`$top`).
    pub top: u32,
    /// Rows to skip (`$skip`).
    pub skip: u32,
    /// Only pages modified strictly after this instant (`$filter ... gt`).
    pub modified_after: Option<DateTime<Utc>>,
}

impl PageQuery {
    /// Query for the `batch`-th batch (0-based) of `page_size` pages.
    ///
    /// The offset saturates at `u32::MAX` instead of wrapping.
    pub fn batch(batch: u32, page_size: u32, modified_after: Option<DateTime<Utc>>) -> Self {
        Self { top: page_size, skip: batch.saturating_mul(page_size), modified_after }
    }

    /// OData query pairs in the order the endpoint documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("$orderby", "lastModifiedDateTime desc".to_string()),
            ("$top", self.top.to_string()),
            ("$skip", self.skip.to_string()),
        ];
        if let Some(after) = &self.modified_after {
            pairs.push(("$filter", format!("lastModifiedDateTime gt {}", format_timestamp(after))));
        }
        pairs
    }
}
