//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`].
use crate::app::App;
use crate::tools::{
    AuthCompleteParams, AuthUrlParams, PageGetParams, PageListParams, ResourceGetParams, auth, pages, resources,
    sections, sync_run,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for the notebook mirror.
#[derive(Clone)]
pub struct OneSyncServer {
    app: App,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OneSyncServer {
    pub fn new(app: App) -> Self {
        Self { app, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Mirror the configured notebook now. Returns completed with section/page totals, failed with the error, or skipped if a sync is already running."
    )]
    async fn sync_run(&self) -> Result<CallToolResult, McpError> {
        sync_run::sync_run_impl(&self.app.sync).await
    }

    #[tool(description = "List mirrored sections ordered by name.")]
    async fn section_list(&self) -> Result<CallToolResult, McpError> {
        sections::section_list_impl(&self.app.store).await
    }

    #[tool(description = "List mirrored pages (newest first) without bodies, optionally for one section.")]
    async fn page_list(&self, params: Parameters<PageListParams>) -> Result<CallToolResult, McpError> {
        pages::page_list_impl(&self.app.store, params.0, self.app.config.page_size).await
    }

    #[tool(description = "Get one mirrored page with its rewritten HTML content.")]
    async fn page_get(&self, params: Parameters<PageGetParams>) -> Result<CallToolResult, McpError> {
        pages::page_get_impl(&self.app.store, params.0).await
    }

    #[tool(description = "Resolve a page resource id to a cached local file, downloading it on first use.")]
    async fn resource_get(&self, params: Parameters<ResourceGetParams>) -> Result<CallToolResult, McpError> {
        resources::resource_get_impl(&self.app.resources, params.0).await
    }

    #[tool(description = "Build the authorization URL the account owner opens to grant access.")]
    async fn auth_url(&self, params: Parameters<AuthUrlParams>) -> Result<CallToolResult, McpError> {
        auth::auth_url_impl(&self.app.tokens, params.0).await
    }

    #[tool(description = "Exchange the authorization code from the redirect and store the resulting tokens.")]
    async fn auth_complete(&self, params: Parameters<AuthCompleteParams>) -> Result<CallToolResult, McpError> {
        auth::auth_complete_impl(&self.app.tokens, &self.app.graph, self.app.config.allowed_email.as_deref(), params.0)
            .await
    }
}

impl ServerHandler for OneSyncServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "onesync".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
