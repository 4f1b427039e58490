use anyhow::{Context, Result};
use clap::Parser;
use module_docs_mcp::cache::utils::human_size;
use module_docs_mcp::{Config, ModuleDocsService};
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCP module docs server on stdio...");
    tracing::info!(
        "Resource cache budget: {} ({} bytes)",
        human_size(config.max_cache_size),
        config.max_cache_size
    );
    tracing::info!("Static snapshots from {}", config.static_dir.display());

    let module_docs_service =
        ModuleDocsService::new(&config).context("Failed to create module docs service")?;

    // Serve using stdio transport
    let service = module_docs_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
