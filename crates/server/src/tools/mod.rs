//! MCP tool implementations.
//!
//! Each tool renders its output struct as pretty JSON text content; errors
//! are `onesync_core::Error` values converted to MCP error data.

pub mod auth;
pub mod pages;
pub mod resources;
pub mod sections;
pub mod sync_run;

pub use auth::{AuthCompleteParams, AuthUrlParams};
pub use pages::{PageGetParams, PageListParams};
pub use resources::ResourceGetParams;

use onesync_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
