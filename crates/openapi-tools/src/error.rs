//! Error types for `openapi-mcp-tools`.

use thiserror::Error;

/// Main error type for spec loading and executor construction.
///
/// Parsing never produces errors (malformed entries are skipped) and executors report call
/// failures inside their response envelope, so everything here is fatal for bootstrap.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    /// Local spec path does not exist.
    #[error("OpenAPI spec not found: {path}")]
    SpecNotFound { path: String },

    /// Local spec path has an extension we cannot decode.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("OpenAPI error: failed to fetch spec from '{url}': {message}")]
    OpenApiSpecFetch { url: String, message: String },

    #[error("OpenAPI error: failed to read spec file '{path}': {source}")]
    OpenApiSpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The outbound HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// JSON parsing errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for `OpenAPI` tooling operations.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;
