//! `OpenAPI` document loader.
//!
//! A spec source is either an `http(s)://` URL or a local file path. The decoded document is a
//! plain [`serde_json::Value`]; object keys keep document order, which the parser relies on.

use crate::error::{OpenApiToolsError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Timeout for fetching a remote spec.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Document encoding, chosen from a file extension, URL suffix, or content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    fn decode(self, content: &str) -> Result<Value> {
        match self {
            SpecFormat::Json => Ok(serde_json::from_str(content)?),
            SpecFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

/// Loads `OpenAPI` documents from files or URLs.
#[derive(Debug, Clone)]
pub struct SpecLoader {
    client: Client,
}

impl SpecLoader {
    /// Create a loader with its own HTTP client (used for URL sources).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| OpenApiToolsError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    /// Load and decode a spec from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or has an unsupported extension, if the remote
    /// fetch fails (transport error or error status), or if the content cannot be decoded.
    pub async fn load(&self, source: &str) -> Result<Value> {
        if is_url(source) {
            self.load_url(source).await
        } else {
            load_file(Path::new(source))
        }
    }

    async fn load_url(&self, url: &str) -> Result<Value> {
        tracing::info!("Fetching OpenAPI spec from {url}");

        let fetch_err = |e: reqwest::Error| OpenApiToolsError::OpenApiSpecFetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let format = if content_type.contains("yaml") || url.ends_with(".yaml") || url.ends_with(".yml")
        {
            SpecFormat::Yaml
        } else {
            SpecFormat::Json
        };

        let body = resp.text().await.map_err(fetch_err)?;
        format.decode(&body)
    }
}

/// Load and decode a local spec file, picking the decoder from the file extension.
///
/// # Errors
///
/// Returns an error if the file does not exist, the extension is not `.json`/`.yaml`/`.yml`,
/// the file cannot be read, or its content cannot be decoded.
pub fn load_file(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(OpenApiToolsError::SpecNotFound {
            path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let format = match extension.as_str() {
        "json" => SpecFormat::Json,
        "yaml" | "yml" => SpecFormat::Yaml,
        _ => {
            return Err(OpenApiToolsError::UnsupportedFormat {
                extension: format!(".{extension}"),
            });
        }
    };

    tracing::info!("Loading OpenAPI spec from {}", path.display());
    let content =
        std::fs::read_to_string(path).map_err(|e| OpenApiToolsError::OpenApiSpecReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

    format.decode(&content)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
