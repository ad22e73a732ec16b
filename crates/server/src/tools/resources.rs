//! resource_get tool implementation.
//!
//! Resolves a rewritten `/resources/<id>` reference to a local file,
//! downloading it into the cache on first use.

use onesync_client::ResourceCache;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the resource_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceGetParams {
    /// Resource id, as it appears after `/resources/` in page content.
    pub id: String,
}

/// Output from the resource_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceGetOutput {
    pub id: String,
    /// Absolute or cache-relative path of the cached file.
    pub path: String,
    /// File size in bytes.
    pub bytes: u64,
}

pub async fn resource_get_impl(cache: &ResourceCache, params: ResourceGetParams) -> Result<CallToolResult, McpError> {
    let id = params.id.trim_start_matches("/resources/").to_string();
    let path = cache.get_or_fetch(&id).await?;
    let bytes = tokio::fs::metadata(&path)
        .await
        .map_err(onesync_core::Error::from)?
        .len();

    json_result(&ResourceGetOutput { id, path: path.display().to_string(), bytes })
}
