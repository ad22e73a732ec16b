//! onesync server entry point.
//!
//! Boots the MCP server on stdio transport and the periodic notebook sync.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use onesync_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod scheduler;
mod sync;
mod task;
mod tools;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        db_path = %config.db_path.display(),
        cache_dir = %config.cache_dir.display(),
        interval_secs = config.sync_interval_secs,
        "starting onesync on stdio transport"
    );

    let app = app::App::open(config).await.context("opening store")?;
    let sync_task = scheduler::spawn(app.sync.clone(), app.config.sync_interval());

    let handler = handler::OneSyncServer::new(app);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    sync_task.abort();
    tracing::info!("stdio transport closed, shutting down");
    Ok(())
}
