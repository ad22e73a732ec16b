//! auth_url and auth_complete tool implementations.
//!
//! The account owner opens the URL from `auth_url`, signs in, and passes the
//! `code` query parameter of the redirect to `auth_complete`. The exchanged
//! token set is only stored when the signed-in account is the allowed one.

use chrono::Utc;
use onesync_client::{GraphClient, TokenManager};
use onesync_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the auth_url tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuthUrlParams {
    /// Opaque value echoed back on the redirect (default: current epoch millis).
    #[serde(default)]
    pub state: Option<String>,
}

/// Output from the auth_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthUrlOutput {
    pub url: String,
    pub state: String,
}

pub async fn auth_url_impl(tokens: &TokenManager, params: AuthUrlParams) -> Result<CallToolResult, McpError> {
    let state = params.state.unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
    let url = tokens.oauth().authorize_url(&state)?;
    json_result(&AuthUrlOutput { url: url.into(), state })
}

/// Parameters for the auth_complete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthCompleteParams {
    /// Authorization code from the redirect.
    pub code: String,
}

/// Output from the auth_complete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthCompleteOutput {
    /// Signed-in account, when it was checked.
    pub account: Option<String>,
    /// Epoch seconds at which the stored access token expires.
    pub expire_at: i64,
}

pub async fn auth_complete_impl(
    tokens: &TokenManager, graph: &GraphClient, allowed_email: Option<&str>, params: AuthCompleteParams,
) -> Result<CallToolResult, McpError> {
    if params.code.trim().is_empty() {
        return Err(Error::InvalidInput("code cannot be empty".into()).into());
    }

    let token = tokens.oauth().exchange_code(params.code.trim()).await?;

    let mut account = None;
    if let Some(allowed) = allowed_email.filter(|e| !e.is_empty()) {
        let me = graph.me(&token.access_token).await?;
        if !me.matches_email(allowed) {
            tracing::warn!(mail = ?me.mail, upn = ?me.user_principal_name, "authorization by unexpected account refused");
            return Err(Error::Auth("signed-in account is not the allowed account".into()).into());
        }
        account = me.mail.or(me.user_principal_name);
    }

    let expire_at = token.expire_at;
    tokens.store(token).await?;
    tracing::info!(account = ?account, expire_at, "authorization completed");

    json_result(&AuthCompleteOutput { account, expire_at })
}
