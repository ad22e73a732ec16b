//! page_list and page_get tool implementations.
//!
//! Read-only views over the mirrored pages; neither touches the remote API.

use onesync_core::{Error, Page, PageSummary, Paged, Store};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Upper bound on `limit`.
const MAX_LIMIT: u32 = 100;

/// Parameters for the page_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageListParams {
    /// Restrict to one section; all sections when omitted.
    #[serde(default)]
    pub section_id: Option<String>,

    /// 1-based page number (default: 1).
    #[serde(default)]
    pub page: Option<u32>,

    /// Rows per page (default: the configured page size, max 100).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Output from the page_list tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PageListOutput {
    #[serde(flatten)]
    pub pages: Paged<PageSummary>,
    /// Last page number for the current `limit`.
    pub max_page: u64,
}

pub async fn page_list_impl(
    store: &Store, params: PageListParams, default_limit: u32,
) -> Result<CallToolResult, McpError> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(default_limit);

    if page == 0 {
        return Err(Error::InvalidInput("page starts at 1".into()).into());
    }
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Error::InvalidInput(format!("limit must be between 1 and {MAX_LIMIT}")).into());
    }

    let section_id = params.section_id.as_deref().filter(|id| !id.is_empty());
    let pages = store.page_list(section_id, page, limit).await?;
    let max_page = pages.max_page();

    json_result(&PageListOutput { pages, max_page })
}

/// Parameters for the page_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageGetParams {
    /// Remote page id.
    pub id: String,
}

/// Output from the page_get tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PageGetOutput {
    pub page: Page,
}

pub async fn page_get_impl(store: &Store, params: PageGetParams) -> Result<CallToolResult, McpError> {
    if params.id.is_empty() {
        return Err(Error::InvalidInput("id cannot be empty".into()).into());
    }

    let page = store
        .page_get(&params.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("page {}", params.id)))?;

    json_result(&PageGetOutput { page })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, section};

    async fn seeded() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.replace_sections(&[section("s1", "Recipes"), section("s2", "Travel")]).await.unwrap();
        for (i, sid) in ["s1", "s1", "s2"].iter().enumerate() {
            let page = Page {
                id: format!("p{i}"),
                section_id: sid.to_string(),
                title: format!("Page {i}"),
                cover: String::new(),
                summary: "text".into(),
                content: "<p>text</p>".into(),
                created_at: at(i as i64),
                updated_at: at(i as i64),
            };
            store.upsert_page(&page).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_page_list_filters_by_section() {
        let store = seeded().await;
        let params = PageListParams { section_id: Some("s1".into()), ..Default::default() };

        let result = page_list_impl(&store, params, 20).await.unwrap();
        let json = serde_json::to_value(&result).unwrap().to_string();
        assert!(json.contains("p0"));
        assert!(json.contains("p1"));
        assert!(!json.contains("p2"));
    }

    #[tokio::test]
    async fn test_page_list_rejects_bad_paging() {
        let store = seeded().await;

        let params = PageListParams { page: Some(0), ..Default::default() };
        assert!(page_list_impl(&store, params, 20).await.is_err());

        let params = PageListParams { limit: Some(101), ..Default::default() };
        assert!(page_list_impl(&store, params, 20).await.is_err());
    }

    #[tokio::test]
    async fn test_page_get() {
        let store = seeded().await;

        let found = page_get_impl(&store, PageGetParams { id: "p2".into() }).await.unwrap();
        assert!(serde_json::to_value(&found).unwrap().to_string().contains("Page 2"));

        let missing = page_get_impl(&store, PageGetParams { id: "nope".into() }).await.unwrap_err();
        assert_eq!(missing.code.0, -32001);
    }
}
