//! Error types for the MCP server.

use openapi_mcp_tools::error::OpenApiToolsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Spec loading or executor construction failed
    #[error(transparent)]
    Tools(#[from] OpenApiToolsError),

    /// Two tools resolved to the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
