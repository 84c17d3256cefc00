//! MCP tools built from parsed operations.

use crate::executor::Executor;
use crate::parser::OperationDescriptor;
use reqwest::Method;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde_json::{Value, json};
use std::sync::Arc;

/// One invocable tool: an operation bound to the shared executor.
#[derive(Debug, Clone)]
pub struct OpenApiTool {
    op: Arc<OperationDescriptor>,
    executor: Arc<Executor>,
}

#[must_use]
pub fn create_tool(op: OperationDescriptor, executor: Arc<Executor>) -> OpenApiTool {
    OpenApiTool {
        op: Arc::new(op),
        executor,
    }
}

impl OpenApiTool {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.op.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.op.description
    }

    #[must_use]
    pub fn operation(&self) -> &OperationDescriptor {
        &self.op
    }

    /// Run the operation and wrap the envelope as pretty-printed JSON text.
    pub async fn call(&self, arguments: &JsonObject) -> CallToolResult {
        let response = self.executor.call(&self.op, arguments).await;
        let reply = json!({
            "operation": self.op.name,
            "method": self.op.method.as_str(),
            "path": self.op.path,
            "description": self.op.description,
            "response": response,
        });
        let text = serde_json::to_string_pretty(&reply).unwrap_or_else(|_| reply.to_string());
        CallToolResult::success(vec![Content::text(text)])
    }

    /// MCP tool definition advertised in `tools/list`.
    #[must_use]
    pub fn definition(&self) -> Tool {
        let schema = match build_input_schema(&self.op) {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        let mut tool = Tool::new(
            self.op.name.clone(),
            self.op.description.clone(),
            Arc::new(schema),
        );
        tool.annotations = Some(annotations_for_method(&self.op.method));
        tool
    }
}

fn build_input_schema(op: &OperationDescriptor) -> Value {
    let mut properties = JsonObject::new();
    let mut required: Vec<&str> = Vec::new();

    for (name, param) in &op.parameters {
        let mut prop = json!({ "type": param.param_type });
        if !param.description.is_empty() {
            prop["description"] = json!(param.description);
        }
        properties.insert(name.clone(), prop);

        if param.required {
            required.push(name);
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

/// Tool hints from HTTP method semantics. Every tool touches an external system.
fn annotations_for_method(method: &Method) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match *method {
        Method::GET => (Some(true), Some(false), Some(true)),
        Method::POST => (Some(false), Some(false), Some(false)),
        Method::PUT | Method::DELETE => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent.
        Method::PATCH => (Some(false), Some(true), None),
        _ => (None, None, None),
    };

    ToolAnnotations {
        title: None,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
