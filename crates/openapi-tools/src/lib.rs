//! OpenAPI -> MCP tool translation.
//!
//! This crate is used by `openapi-mcp-server`:
//! - [`loader`] fetches and decodes an `OpenAPI` document (file or URL, JSON or YAML)
//! - [`parser`] turns the document into [`parser::OperationDescriptor`]s
//! - [`executor`] answers tool calls, either with real HTTP requests or with canned mock data
//! - [`tool`] pairs a descriptor with an executor into one callable MCP tool
//!
//! It intentionally contains **no** MCP transport or process configuration logic.

pub mod error;
pub mod executor;
pub mod loader;
pub mod parser;
pub mod tool;
