//! Executors turn an operation plus call arguments into a JSON response envelope.
//!
//! Every envelope carries `success`. Failures are reported inside the envelope
//! (`error`, `error_type`) and never surface as Rust errors.

pub mod http;
pub mod mock;

pub use http::HttpExecutor;
pub use mock::MockExecutor;

use crate::parser::OperationDescriptor;
use rmcp::model::JsonObject;
use serde_json::Value;

/// Executor chosen once at startup and shared by every tool.
#[derive(Debug)]
pub enum Executor {
    Mock(MockExecutor),
    Http(HttpExecutor),
}

impl Executor {
    pub async fn call(&self, op: &OperationDescriptor, arguments: &JsonObject) -> Value {
        match self {
            Executor::Mock(mock) => mock.call(op, arguments),
            Executor::Http(http) => http.call(op, arguments).await,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Executor::Mock(_) => "mock",
            Executor::Http(_) => "http",
        }
    }
}
