//! section_list tool implementation.

use onesync_core::{Section, Store};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use super::json_result;

/// Output from the section_list tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SectionListOutput {
    pub sections: Vec<Section>,
}

pub async fn section_list_impl(store: &Store) -> Result<CallToolResult, McpError> {
    let sections = store.sections().await?;
    json_result(&SectionListOutput { sections })
}
