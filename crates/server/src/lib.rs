//! MCP host for `OpenAPI`-generated tools.
//!
//! `config` resolves where the spec comes from, `bootstrap` turns it into an
//! [`server::OpenApiMcpServer`], and the binary serves that over stdio or streamable HTTP.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod server;
