//! `OpenAPI` operation parser.
//!
//! Walks the decoded document's `paths` tree (in document order) and produces one
//! [`OperationDescriptor`] per supported `(path, method)` pair.
//!
//! Parsing is deliberately forgiving: anything malformed is skipped with a warning rather than
//! failing the whole spec.

use regex::Regex;
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

/// Server name used when the spec has no `info.title`.
pub const DEFAULT_SERVER_NAME: &str = "Dynamic OpenAPI MCP Server";

/// Description used when an operation has neither `summary` nor `description`.
pub const DEFAULT_DESCRIPTION: &str = "No description";

static PATH_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("valid path parameter regex"));

/// Where an argument goes when the operation is called over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Body,
    /// Any other declared `in` value (e.g. `cookie`). Kept so callers can ignore it explicitly.
    Other(String),
}

impl ParamLocation {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "path" => ParamLocation::Path,
            "query" => ParamLocation::Query,
            "header" => ParamLocation::Header,
            "body" => ParamLocation::Body,
            other => ParamLocation::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Body => "body",
            ParamLocation::Other(raw) => raw,
        }
    }
}

/// A single tool argument derived from the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// JSON schema `type` (defaults to `string`).
    pub param_type: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: String,
}

/// Normalized metadata for one `OpenAPI` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Tool name: `operationId`, or synthesized from method + path.
    pub name: String,
    pub method: Method,
    /// Raw path template, e.g. `/orders/{orderId}`.
    pub path: String,
    /// First `servers[].url` of the spec, or empty.
    pub base_url: String,
    pub description: String,
    /// Arguments by name. Body properties overwrite equally named declared parameters.
    pub parameters: BTreeMap<String, ParamSpec>,
    /// Placeholder names in `path`, left to right, duplicates preserved.
    pub path_params: Vec<String>,
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Operation {}: {} {}>", self.name, self.method, self.path)
    }
}

/// Parser over a decoded `OpenAPI` document.
#[derive(Debug, Clone, Copy)]
pub struct OpenApiParser<'a> {
    spec: &'a Value,
}

impl<'a> OpenApiParser<'a> {
    #[must_use]
    pub fn new(spec: &'a Value) -> Self {
        Self { spec }
    }

    /// `info.title`, or [`DEFAULT_SERVER_NAME`].
    #[must_use]
    pub fn server_name(&self) -> String {
        self.spec
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SERVER_NAME)
            .to_string()
    }

    /// `servers[0].url`, or an empty string if absent or malformed.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.spec
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Parse every supported operation in document order.
    #[must_use]
    pub fn operations(&self) -> Vec<OperationDescriptor> {
        let Some(paths) = self.spec.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let base_url = self.base_url();
        let mut tool_names: HashSet<String> = HashSet::new();
        let mut ops = Vec::new();

        for (path, path_item) in paths {
            let Some(methods) = self.deref(path_item).and_then(Value::as_object) else {
                tracing::warn!("Skipping path '{path}': path item is not an object");
                continue;
            };

            for (method, operation) in methods {
                let Some(method) = resolve_http_method(method) else {
                    continue;
                };
                let Some(operation) = operation.as_object() else {
                    tracing::warn!("Skipping {method} {path}: operation is not an object");
                    continue;
                };

                let mut op = self.parse_operation(path, &method, operation, &base_url);
                let unique = reserve_unique_tool_name(&mut tool_names, &op.name);
                if unique != op.name {
                    tracing::warn!(
                        "Duplicate operation name '{}' for {method} {path}; exposing it as '{unique}'",
                        op.name
                    );
                    op.name = unique;
                }
                ops.push(op);
            }
        }

        ops
    }

    fn parse_operation(
        &self,
        path: &str,
        method: &Method,
        operation: &'a Map<String, Value>,
        base_url: &str,
    ) -> OperationDescriptor {
        let name = operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map_or_else(|| generate_canonical_name(method, path), str::to_string);

        let description = ["summary", "description"]
            .iter()
            .filter_map(|key| operation.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string();

        let mut parameters = BTreeMap::new();
        self.collect_declared_params(operation, &mut parameters);
        self.collect_body_params(operation, &mut parameters);

        OperationDescriptor {
            name,
            method: method.clone(),
            path: path.to_string(),
            base_url: base_url.to_string(),
            description,
            parameters,
            path_params: extract_path_params(path),
        }
    }

    /// Path/query/header (and any other `in`) parameters from the operation's `parameters`.
    fn collect_declared_params(
        &self,
        operation: &'a Map<String, Value>,
        out: &mut BTreeMap<String, ParamSpec>,
    ) {
        let Some(list) = operation.get("parameters").and_then(Value::as_array) else {
            return;
        };

        for entry in list {
            let Some(param) = self.deref(entry).and_then(Value::as_object) else {
                continue;
            };
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                tracing::warn!("Skipping parameter without a name");
                continue;
            };

            let schema = param.get("schema").and_then(|s| self.deref(s));
            out.insert(
                name.to_string(),
                ParamSpec {
                    param_type: schema_type(schema),
                    location: ParamLocation::parse(
                        param.get("in").and_then(Value::as_str).unwrap_or("query"),
                    ),
                    required: param
                        .get("required")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    description: string_field(param.get("description")),
                },
            );
        }
    }

    /// Flatten `requestBody.content.*.schema.properties` into body parameters.
    ///
    /// Media types are visited in document order; a later media type's property overwrites an
    /// earlier one with the same name.
    fn collect_body_params(
        &self,
        operation: &'a Map<String, Value>,
        out: &mut BTreeMap<String, ParamSpec>,
    ) {
        let Some(body) = operation.get("requestBody").and_then(|b| self.deref(b)) else {
            return;
        };
        let Some(content) = body.get("content").and_then(Value::as_object) else {
            return;
        };

        for media in content.values() {
            let Some(schema) = media.get("schema").and_then(|s| self.deref(s)) else {
                continue;
            };
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                continue;
            };
            let required: HashSet<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            for (prop_name, prop_schema) in properties {
                let prop_schema = self.deref(prop_schema);
                out.insert(
                    prop_name.clone(),
                    ParamSpec {
                        param_type: schema_type(prop_schema),
                        location: ParamLocation::Body,
                        required: required.contains(prop_name.as_str()),
                        description: string_field(
                            prop_schema.and_then(|s| s.get("description")),
                        ),
                    },
                );
            }
        }
    }

    /// Follow local `$ref` pointers (`#/...`) until a concrete value is reached.
    ///
    /// Returns `None` for external refs, dangling pointers, and cycles.
    fn deref(&self, value: &'a Value) -> Option<&'a Value> {
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut current = value;

        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            if !seen.insert(reference) {
                tracing::warn!("Cyclic $ref detected while resolving: {reference}");
                return None;
            }
            let Some(pointer) = reference.strip_prefix('#') else {
                tracing::warn!("Unsupported external $ref: {reference}");
                return None;
            };
            let Some(target) = self.spec.pointer(pointer) else {
                tracing::warn!("Unresolved $ref: {reference}");
                return None;
            };
            current = target;
        }

        Some(current)
    }
}

/// Placeholder names inside `{...}` in a path template.
#[must_use]
pub fn extract_path_params(path: &str) -> Vec<String> {
    PATH_PARAM_RE
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Name for an operation without `operationId`: `get /users/{id}/posts` -> `get_users_id_posts`.
fn generate_canonical_name(method: &Method, path: &str) -> String {
    let segments = path.trim_matches('/').replace('/', "_").replace(['{', '}'], "");
    format!("{}_{segments}", method.as_str().to_ascii_lowercase())
}

fn reserve_unique_tool_name(tool_names: &mut HashSet<String>, base: &str) -> String {
    let base = base.to_string();
    if tool_names.insert(base.clone()) {
        return base;
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{base}_{counter}");
        if tool_names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Map a spec method key to a supported HTTP method (case-insensitive).
fn resolve_http_method(method: &str) -> Option<Method> {
    match method.to_ascii_lowercase().as_str() {
        "get" => Some(Method::GET),
        "post" => Some(Method::POST),
        "put" => Some(Method::PUT),
        "patch" => Some(Method::PATCH),
        "delete" => Some(Method::DELETE),
        _ => None,
    }
}

fn schema_type(schema: Option<&Value>) -> String {
    schema
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("string")
        .to_string()
}

fn string_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
