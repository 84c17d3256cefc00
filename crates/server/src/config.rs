//! Command line, environment and config file handling.
//!
//! Precedence is CLI, then environment, then the JSON config file.

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "mcp_config.json";
pub const SPEC_ENV: &str = "OPENAPI_SPEC";
pub const REAL_API_ENV: &str = "USE_REAL_API";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`
    Http,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "openapi-mcp-server", version)]
#[command(about = "Expose an OpenAPI-described HTTP API as MCP tools")]
#[command(after_help = "Examples:
  openapi-mcp-server --spec spec.json
  openapi-mcp-server --spec spec.yaml --real-api
  openapi-mcp-server                       # reads mcp_config.json

Config file example (mcp_config.json):
  {\"spec_path\": \"./specs/pizza_api.json\", \"use_real_api\": false}")]
pub struct Cli {
    /// `OpenAPI` JSON/YAML file or http(s) URL
    #[arg(long)]
    pub spec: Option<String>,

    /// Send real HTTP requests instead of mock responses
    #[arg(long)]
    pub real_api: bool,

    /// JSON config file with `spec_path` / `use_real_api`
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for `--transport http`
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Default log filter; `RUST_LOG` overrides it
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Contents of the JSON config file. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub spec_path: Option<String>,
    #[serde(default)]
    pub use_real_api: Option<bool>,
}

/// Read the config file. A missing file is an empty config.
pub fn load_config(path: &Path) -> anyhow::Result<FileConfig> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(e).with_context(|| format!("read config {}", path.display())),
    };
    let cfg: FileConfig =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Like [`load_config`], but any failure is logged and treated as an empty config.
#[must_use]
pub fn load_config_or_default(path: &Path) -> FileConfig {
    load_config(path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {e:#}");
        FileConfig::default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecOrigin {
    Cli,
    Environment,
    ConfigFile,
}

impl fmt::Display for SpecOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpecOrigin::Cli => "command line",
            SpecOrigin::Environment => "environment",
            SpecOrigin::ConfigFile => "config",
        })
    }
}

/// Effective settings after merging every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub spec_source: String,
    pub spec_origin: SpecOrigin,
    pub use_real_api: bool,
}

impl Settings {
    /// Merge CLI, environment (looked up through `env`) and file config.
    ///
    /// Returns `None` when no source names a spec. Empty values count as unset.
    pub fn resolve(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
        file: &FileConfig,
    ) -> Option<Self> {
        let non_empty = |v: String| (!v.is_empty()).then_some(v);

        let (spec_source, spec_origin) = if let Some(spec) = cli.spec.clone().and_then(non_empty)
        {
            (spec, SpecOrigin::Cli)
        } else if let Some(spec) = env(SPEC_ENV).and_then(non_empty) {
            (spec, SpecOrigin::Environment)
        } else {
            (file.spec_path.clone().and_then(non_empty)?, SpecOrigin::ConfigFile)
        };

        // The environment can only switch real calls on.
        let use_real_api = cli.real_api
            || env(REAL_API_ENV).is_some_and(|flag| parse_flag(&flag))
            || file.use_real_api.unwrap_or(false);

        Some(Self {
            spec_source,
            spec_origin,
            use_real_api,
        })
    }
}

/// `true`, `1` and `yes` (any case) are true; everything else is false.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("openapi-mcp-server").chain(args.iter().copied()))
            .unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file(spec: Option<&str>, real: Option<bool>) -> FileConfig {
        FileConfig {
            spec_path: spec.map(str::to_string),
            use_real_api: real,
        }
    }

    #[test]
    fn cli_defaults() {
        let cli = cli(&[]);
        assert_eq!(cli.spec, None);
        assert!(!cli.real_api);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.transport, Transport::Stdio);
        assert_eq!(cli.bind, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn cli_parses_every_flag() {
        let cli = cli(&[
            "--spec",
            "api.yaml",
            "--real-api",
            "--config",
            "other.json",
            "--transport",
            "http",
            "--bind",
            "0.0.0.0:9000",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.spec.as_deref(), Some("api.yaml"));
        assert!(cli.real_api);
        assert_eq!(cli.config, PathBuf::from("other.json"));
        assert_eq!(cli.transport, Transport::Http);
        assert_eq!(cli.bind.port(), 9000);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = file(Some("file.json"), Some(true));

        let s = Settings::resolve(
            &cli(&["--spec", "cli.json"]),
            env(&[(SPEC_ENV, "env.json")]),
            &file,
        )
        .unwrap();
        assert_eq!(s.spec_source, "cli.json");
        assert_eq!(s.spec_origin, SpecOrigin::Cli);

        let s = Settings::resolve(&cli(&[]), env(&[(SPEC_ENV, "env.json")]), &file).unwrap();
        assert_eq!(s.spec_source, "env.json");
        assert_eq!(s.spec_origin, SpecOrigin::Environment);

        let s = Settings::resolve(&cli(&[]), env(&[]), &file).unwrap();
        assert_eq!(s.spec_source, "file.json");
        assert_eq!(s.spec_origin, SpecOrigin::ConfigFile);
        assert!(s.use_real_api);
    }

    #[test]
    fn empty_values_are_unset() {
        let s = Settings::resolve(
            &cli(&["--spec", ""]),
            env(&[(SPEC_ENV, "")]),
            &file(Some("file.json"), None),
        )
        .unwrap();
        assert_eq!(s.spec_origin, SpecOrigin::ConfigFile);
    }

    #[test]
    fn no_spec_anywhere() {
        assert_eq!(
            Settings::resolve(&cli(&[]), env(&[]), &FileConfig::default()),
            None
        );
        assert_eq!(
            Settings::resolve(&cli(&[]), env(&[]), &file(Some(""), Some(true))),
            None
        );
    }

    #[test]
    fn real_api_precedence() {
        let on = file(Some("s.json"), Some(true));
        let off = file(Some("s.json"), Some(false));
        fn resolve(args: &[&str], pairs: &[(&str, &str)], f: &FileConfig) -> bool {
            Settings::resolve(&cli(args), env(pairs), f)
                .unwrap()
                .use_real_api
        }

        assert!(resolve(&["--real-api"], &[(REAL_API_ENV, "false")], &off));
        assert!(resolve(&[], &[(REAL_API_ENV, "YES")], &off));
        assert!(resolve(&[], &[(REAL_API_ENV, "1")], &off));
        assert!(resolve(&[], &[(REAL_API_ENV, "True")], &off));
        assert!(resolve(&[], &[(REAL_API_ENV, "no")], &on));
        assert!(resolve(&[], &[(REAL_API_ENV, "enabled")], &on));
        assert!(!resolve(&[], &[(REAL_API_ENV, "no")], &off));
        assert!(!resolve(&[], &[(REAL_API_ENV, "enabled")], &off));
        assert!(resolve(&[], &[(REAL_API_ENV, "")], &on));
        assert!(!resolve(&[], &[], &off));
        assert!(!resolve(&[], &[], &file(Some("s.json"), None)));
    }

    #[test]
    fn load_config_variants() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert_eq!(load_config(&missing).unwrap(), FileConfig::default());

        let good = dir.path().join("good.json");
        std::fs::write(
            &good,
            r#"{"spec_path": "./specs/pizza.json", "use_real_api": true, "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(
            load_config(&good).unwrap(),
            file(Some("./specs/pizza.json"), Some(true))
        );

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(load_config(&bad).is_err());
        assert_eq!(load_config_or_default(&bad), FileConfig::default());

        let wrong_type = dir.path().join("wrong.json");
        std::fs::write(&wrong_type, r#"{"use_real_api": "sometimes"}"#).unwrap();
        assert_eq!(load_config_or_default(&wrong_type), FileConfig::default());
    }
}
