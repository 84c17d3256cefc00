//! Real HTTP calls against the operation's upstream.

use crate::error::{OpenApiToolsError, Result};
use crate::parser::{OperationDescriptor, ParamLocation};
use reqwest::Client;
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use std::time::Duration;

/// Fixed per-request timeout of the shared client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Arguments split by where they travel.
#[derive(Debug, Default, PartialEq)]
pub struct RequestParts {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: JsonObject,
}

impl RequestParts {
    /// Sort declared arguments into query, header and body.
    ///
    /// Path arguments are consumed by [`build_url`]. Undeclared arguments and unknown
    /// locations are dropped.
    #[must_use]
    pub fn classify(op: &OperationDescriptor, arguments: &JsonObject) -> Self {
        let mut parts = Self::default();

        for (key, value) in arguments {
            let Some(param) = op.parameters.get(key) else {
                continue;
            };
            match &param.location {
                ParamLocation::Query => parts.query.push((key.clone(), value_to_string(value))),
                ParamLocation::Header => {
                    parts.headers.push((key.clone(), value_to_string(value)));
                }
                ParamLocation::Body => {
                    parts.body.insert(key.clone(), value.clone());
                }
                ParamLocation::Path | ParamLocation::Other(_) => {}
            }
        }

        parts
    }
}

/// `base_url + path` with every supplied path argument substituted.
#[must_use]
pub fn build_url(op: &OperationDescriptor, arguments: &JsonObject) -> String {
    let mut url = format!("{}{}", op.base_url, op.path);
    for name in &op.path_params {
        if let Some(value) = arguments.get(name) {
            url = url.replace(&format!("{{{name}}}"), &value_to_string(value));
        }
    }
    url
}

#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OpenApiToolsError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Perform the request. Transport failures come back as a `success: false` envelope.
    pub async fn call(&self, op: &OperationDescriptor, arguments: &JsonObject) -> Value {
        match self.execute(op, arguments).await {
            Ok(envelope) => envelope,
            Err(err) => {
                let error_type = error_type(&err);
                tracing::warn!(operation = %op.name, error_type, "Upstream request failed: {err}");
                json!({
                    "success": false,
                    "error": err.to_string(),
                    "error_type": error_type,
                })
            }
        }
    }

    async fn execute(
        &self,
        op: &OperationDescriptor,
        arguments: &JsonObject,
    ) -> std::result::Result<Value, reqwest::Error> {
        let url = build_url(op, arguments);
        let parts = RequestParts::classify(op, arguments);
        tracing::debug!(operation = %op.name, method = %op.method, %url, "Calling upstream");

        let mut request = self.client.request(op.method.clone(), &url);
        if !parts.query.is_empty() {
            request = request.query(&parts.query);
        }
        for (name, value) in parts.headers {
            request = request.header(name, value);
        }
        if !parts.body.is_empty() {
            request = request.json(&parts.body);
        }

        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let text = response.text().await?;
        let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));

        Ok(json!({
            "success": true,
            "status_code": status_code,
            "data": data,
            "url": final_url,
        }))
    }
}

/// Failure class reported as `error_type`.
fn error_type(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "Timeout"
    } else if err.is_connect() {
        "Connect"
    } else if err.is_redirect() {
        "Redirect"
    } else if err.is_builder() {
        "Builder"
    } else if err.is_status() {
        "Status"
    } else if err.is_body() {
        "Body"
    } else if err.is_decode() {
        "Decode"
    } else if err.is_request() {
        "Request"
    } else {
        "Other"
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}
