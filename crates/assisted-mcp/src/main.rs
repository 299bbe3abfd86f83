use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use assisted_client::RestAssistedClient;
use assisted_mcp::{
    adapter::ApiAdapter,
    config::{self, McpConfig},
    logging,
    server::AssistedMcpServer,
};
use clap::Parser;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};

#[derive(Parser)]
#[command(
    name = "assisted-mcp",
    about = "Assisted Installer MCP server: exposes OpenShift cluster management tools over HTTP"
)]
struct Cli {
    /// Path to an assisted-mcp.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for the rotating log file
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = McpConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.log_dir {
        config.logging.directory = dir;
    }

    logging::init(&config.logging).with_context(|| {
        format!(
            "Failed to open log file {}",
            config.logging.path().display()
        )
    })?;

    let offline_token = config::offline_token().inspect_err(|e| {
        tracing::error!(error = %e, "Missing credentials");
    })?;

    let client = RestAssistedClient::new(
        &config.api.url,
        &config.api.sso_url,
        offline_token,
        config.api.request_timeout(),
    )
    .inspect_err(|e| tracing::error!(error = %e, "Failed to initialize Assisted Installer client"))?;
    tracing::info!(api_url = %config.api.url, "Initialized Assisted Installer client");

    let adapter = ApiAdapter::new(Arc::new(client));
    let service = StreamableHttpService::new(
        move || Ok(AssistedMcpServer::new(adapter.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let addrs = config.server.listen_addrs().with_context(|| {
        format!(
            "Invalid listen address {}:{}",
            config.server.host, config.server.port
        )
    })?;
    let listener = tokio::net::TcpListener::bind(addrs.as_slice())
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;

    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Assisted MCP server listening on /mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Server stopped by user");
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Server crashed"))?;

    tracing::info!("Assisted MCP server shutting down");
    Ok(())
}
