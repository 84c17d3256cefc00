//! rmcp `ServerHandler` over the generated tools.

use crate::error::{Result, ServerError};
use axum::Router;
use axum::routing::get;
use openapi_mcp_tools::tool::OpenApiTool;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData, ServerHandler};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Registered tools in registration order, looked up by name.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<OpenApiTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: OpenApiTool) -> Result<()> {
        if self.by_name.contains_key(tool.name()) {
            return Err(ServerError::DuplicateTool(tool.name().to_string()));
        }
        self.by_name.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OpenApiTool> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenApiTool> {
        self.tools.iter()
    }

    #[must_use]
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(OpenApiTool::definition).collect()
    }
}

/// MCP server named after the spec, exposing one tool per operation.
#[derive(Debug, Clone)]
pub struct OpenApiMcpServer {
    name: String,
    registry: Arc<ToolRegistry>,
}

impl OpenApiMcpServer {
    #[must_use]
    pub fn new(name: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a tool by name. Unknown names are an `invalid_params` error; executor failures are
    /// reported inside the tool's JSON text.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let Some(tool) = self.registry.get(name) else {
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            ));
        };

        tracing::debug!(tool = name, "Tool call");
        let arguments = arguments.unwrap_or_default();
        Ok(tool.call(&arguments).await)
    }
}

impl ServerHandler for OpenApiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} tools generated from an OpenAPI document. Each tool returns the upstream \
                 response as JSON text.",
                self.registry.len()
            )),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_
    {
        std::future::ready(Ok(ListToolsResult {
            tools: self.registry.definitions(),
            next_cursor: None,
            meta: None,
        }))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_
    {
        async move { self.dispatch(&request.name, request.arguments).await }
    }
}

/// Axum app serving MCP at `/mcp` plus a `/health` check.
pub fn router(server: OpenApiMcpServer, shutdown: CancellationToken) -> Router {
    let config = StreamableHttpServerConfig {
        cancellation_token: shutdown,
        ..Default::default()
    };
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        config,
    );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}
