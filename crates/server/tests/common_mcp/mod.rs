use anyhow::Context as _;
use futures::StreamExt as _;
use serde_json::json;
use std::time::Duration;
use tokio::io::AsyncBufReadExt as _;
use tokio_util::io::StreamReader;

/// Bare-bones MCP client for the server's streamable HTTP endpoint (`/mcp`).
pub struct McpStreamableHttpSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl McpStreamableHttpSession {
    pub async fn connect(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let init_resp = post_mcp(&client, &base_url, None, json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "openapi-mcp-server-integration-tests", "version": "0" }
            }
        }))
        .await?;

        let session_id = init_resp
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|h| h.to_str().ok())
            .context("missing Mcp-Session-Id header")?
            .to_string();

        let init_msg = read_json_message(init_resp).await?;
        anyhow::ensure!(init_msg.get("id") == Some(&json!(0)), "unexpected init id");

        // notifications/initialized
        let initialized_resp = post_mcp(
            &client,
            &base_url,
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await?;

        anyhow::ensure!(
            initialized_resp.status().as_u16() == 202,
            "POST /mcp notifications/initialized returned {}",
            initialized_resp.status()
        );

        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    pub async fn request(
        &self,
        id: u64,
        method: &str,
        params: serde_json::Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<serde_json::Value> {
        let resp = post_mcp(
            &self.client,
            &self.base_url,
            Some(&self.session_id),
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }),
        )
        .await?;

        let msg = tokio::time::timeout(timeout_dur, read_json_message(resp))
            .await
            .context("timeout waiting for event-stream response")??;

        Ok(msg)
    }
}

/// Parse `result.content[0].text` of a `tools/call` response as JSON.
#[allow(dead_code)]
pub fn tool_reply_json(msg: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
    let text = msg
        .get("result")
        .context("tools/call missing result")?
        .get("content")
        .and_then(serde_json::Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("text"))
        .and_then(serde_json::Value::as_str)
        .context("tools/call missing result.content[0].text")?;

    serde_json::from_str(text).context("tools/call text is not JSON")
}

/// Names from a `tools/list` response, in order.
#[allow(dead_code)]
pub fn tool_names(msg: &serde_json::Value) -> anyhow::Result<Vec<String>> {
    let tools = msg
        .get("result")
        .and_then(|r| r.get("tools"))
        .and_then(serde_json::Value::as_array)
        .context("tools/list missing result.tools")?;

    Ok(tools
        .iter()
        .filter_map(|t| t.get("name").and_then(serde_json::Value::as_str))
        .map(str::to_string)
        .collect())
}

async fn post_mcp(
    client: &reqwest::Client,
    base_url: &str,
    session_id: Option<&str>,
    body: serde_json::Value,
) -> anyhow::Result<reqwest::Response> {
    let mut req = client
        .post(format!("{}/mcp", base_url.trim_end_matches('/')))
        .header("Accept", "application/json, text/event-stream")
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(session_id) = session_id {
        req = req.header("Mcp-Session-Id", session_id);
    }

    req.send()
        .await
        .context("POST /mcp")?
        .error_for_status()
        .context("POST /mcp status")
}

/// First JSON-RPC message of a response, whether sent as plain JSON or as an SSE stream.
async fn read_json_message(resp: reqwest::Response) -> anyhow::Result<serde_json::Value> {
    let is_json = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return resp.json().await.context("parse JSON response");
    }

    let byte_stream = resp.bytes_stream().map(|r| r.map_err(std::io::Error::other));
    let mut lines = tokio::io::BufReader::new(StreamReader::new(byte_stream)).lines();

    let mut event = SseEvent::default();
    while let Some(line) = lines.next_line().await.context("read event stream")? {
        if let Some(msg) = event.push_line(&line) {
            return msg;
        }
    }

    anyhow::bail!("event stream ended without a JSON message")
}

/// First JSON-RPC message in a buffered SSE body.
#[allow(dead_code)]
pub fn parse_sse_json(body: &str) -> anyhow::Result<serde_json::Value> {
    let mut event = SseEvent::default();
    for line in body.lines().chain(std::iter::once("")) {
        if let Some(msg) = event.push_line(line) {
            return msg;
        }
    }

    anyhow::bail!("event stream ended without a JSON message")
}

/// Data lines of the SSE event being read.
#[derive(Default)]
struct SseEvent {
    data: Vec<String>,
}

impl SseEvent {
    /// Feed one line; returns the parsed payload once an event with data ends.
    ///
    /// Empty payloads (the priming event, keep-alives) are skipped.
    fn push_line(&mut self, line: &str) -> Option<anyhow::Result<serde_json::Value>> {
        let line = line.trim_end();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() {
                self.data.push(data.to_string());
            }
            return None;
        }
        if !line.is_empty() || self.data.is_empty() {
            return None;
        }

        let payload = std::mem::take(&mut self.data).join("\n");
        Some(serde_json::from_str(&payload).context("parse SSE data as JSON"))
    }
}
