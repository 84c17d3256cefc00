use anyhow::Context as _;
use clap::{CommandFactory as _, Parser as _};
use openapi_mcp_server::bootstrap::bootstrap;
use openapi_mcp_server::config::{Cli, LogFormat, Settings, Transport, load_config_or_default};
use openapi_mcp_server::server::{OpenApiMcpServer, router};
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let file = load_config_or_default(&cli.config);
    let Some(settings) = Settings::resolve(&cli, |key| std::env::var(key).ok(), &file) else {
        eprintln!("No OpenAPI spec provided!\n");
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::from(1);
    };
    tracing::info!(
        "Using spec from {}: {}",
        settings.spec_origin,
        settings.spec_source
    );

    let server = match bootstrap(&settings.spec_source, settings.use_real_api).await {
        Ok(server) => server,
        Err(_) => return ExitCode::FAILURE,
    };

    let served = match cli.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, cli.bind).await,
    };
    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.with_ansi(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn serve_stdio(server: OpenApiMcpServer) -> anyhow::Result<()> {
    tracing::info!("Serving MCP over stdio");
    let service = rmcp::serve_server(server, rmcp::transport::io::stdio())
        .await
        .context("start stdio transport")?;
    service.waiting().await.context("stdio transport")?;
    Ok(())
}

async fn serve_http(server: OpenApiMcpServer, bind: SocketAddr) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let app = router(server, shutdown.child_token());

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    tracing::info!("Serving MCP over streamable HTTP at http://{bind}/mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await
        .context("http server")?;
    Ok(())
}
