//! Build a ready-to-serve [`OpenApiMcpServer`] from a spec source.

use crate::error::Result;
use crate::server::{OpenApiMcpServer, ToolRegistry};
use openapi_mcp_tools::executor::{Executor, HttpExecutor, MockExecutor};
use openapi_mcp_tools::loader::SpecLoader;
use openapi_mcp_tools::parser::OpenApiParser;
use openapi_mcp_tools::tool::create_tool;
use std::sync::Arc;

/// Load, parse, pick the executor and register one tool per operation.
///
/// Nothing is returned on failure; the error is logged and handed back.
pub async fn bootstrap(spec_source: &str, use_real_api: bool) -> Result<OpenApiMcpServer> {
    build(spec_source, use_real_api).await.inspect_err(|e| {
        tracing::error!("Error bootstrapping MCP server: {e}");
    })
}

async fn build(spec_source: &str, use_real_api: bool) -> Result<OpenApiMcpServer> {
    tracing::info!("Loading OpenAPI spec: {spec_source}");
    let spec = SpecLoader::new()?.load(spec_source).await?;
    let parser = OpenApiParser::new(&spec);

    let executor = if use_real_api {
        tracing::info!("Using REAL API executor");
        Executor::Http(HttpExecutor::new()?)
    } else {
        tracing::info!("Using MOCK executor");
        Executor::Mock(MockExecutor::new())
    };
    let executor = Arc::new(executor);

    let server_name = parser.server_name();
    let mut registry = ToolRegistry::new();
    for op in parser.operations() {
        let line = format!("✓ {} ({} {})", op.name, op.method, op.path);
        registry.register(create_tool(op, Arc::clone(&executor)))?;
        tracing::info!("  {line}");
    }

    tracing::info!(
        executor = executor.kind(),
        "MCP server ready: {server_name} ({} operations)",
        registry.len()
    );
    Ok(OpenApiMcpServer::new(server_name, registry))
}
