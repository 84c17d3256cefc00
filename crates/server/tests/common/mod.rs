#![allow(dead_code)]

use anyhow::Context as _;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use openapi_mcp_test_support::{KillOnDrop, wait_exit, write_file};

pub const PIZZA_SPEC: &str = r#"{
  "openapi": "3.0.0",
  "info": {"title": "Pizza Delivery API", "version": "1.0.0"},
  "servers": [{"url": "https://api.pizza.example"}],
  "paths": {
    "/menu": {
      "get": {
        "operationId": "listMenu",
        "summary": "List the pizza menu",
        "parameters": [{"name": "category", "in": "query", "schema": {"type": "string"}}]
      }
    },
    "/orders": {
      "post": {
        "operationId": "placeOrder",
        "summary": "Place an order",
        "requestBody": {"content": {"application/json": {"schema": {
          "type": "object",
          "required": ["pizza_id"],
          "properties": {
            "pizza_id": {"type": "string"},
            "size": {"type": "string"},
            "quantity": {"type": "integer"}
          }
        }}}}
      }
    },
    "/orders/{orderId}": {
      "get": {
        "operationId": "trackOrder",
        "parameters": [{"name": "orderId", "in": "path", "required": true}]
      }
    }
  }
}"#;

pub fn pick_unused_port() -> anyhow::Result<u16> {
    openapi_mcp_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    openapi_mcp_test_support::wait_http_ok(url, timeout_dur).await
}

/// Base command with the spec-related environment cleared.
pub fn server_command(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_openapi-mcp-server"));
    cmd.current_dir(cwd)
        .env_remove("OPENAPI_SPEC")
        .env_remove("USE_REAL_API")
        .env("RUST_LOG", "info")
        .stdin(Stdio::null())
        .stdout(Stdio::null());
    cmd
}

/// Spawn the server on streamable HTTP at `127.0.0.1:{port}`.
pub fn spawn_http_server(cwd: &Path, port: u16, extra_args: &[&str]) -> anyhow::Result<Child> {
    server_command(cwd)
        .arg("--transport")
        .arg("http")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .args(extra_args)
        .spawn()
        .context("spawn openapi-mcp-server")
}
