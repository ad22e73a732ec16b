//! sync_run tool implementation.
//!
//! Runs the guarded notebook sync now and reports how the trigger ended.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use super::json_result;
use crate::sync::SyncSummary;
use crate::task::{TaskGuard, TaskOutcome};

/// Output from the sync_run tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SyncRunOutput {
    /// `completed` with run totals, `failed` with the error, or `skipped`
    /// when a run was already in progress.
    pub outcome: TaskOutcome<SyncSummary>,
}

pub async fn sync_run_impl(guard: &TaskGuard<SyncSummary>) -> Result<CallToolResult, McpError> {
    let outcome = guard.trigger().await;
    json_result(&SyncRunOutput { outcome })
}
