//! MCP over stdio. Stdout carries protocol frames only; logs go to stderr.

use tutorial_videos::bundle::BundleCache;
use tutorial_videos::logging::{self, FaultPolicy, LogTarget};
use tutorial_videos::tools::{build_server, ToolOptions};
use tutorial_videos::{AppError, Config};

async fn run() -> Result<(), AppError> {
    let config = Config::from_env(0)?;
    let options = match config.widget_url.as_deref() {
        Some(widget_url) => {
            tracing::info!(widget_url, "linking hosted widget pages");
            ToolOptions::for_stdio(Some(widget_url), BundleCache::unavailable())
        }
        None => ToolOptions::for_stdio(None, BundleCache::load(&config.bundle_path).await),
    };

    let srv = build_server("tutorial-video-mcp", env!("CARGO_PKG_VERSION"), options);

    tracing::info!(server = srv.name(), "MCP stdio server running");
    mcpserver::serve_stdio(&srv).await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init(LogTarget::Stderr);
    logging::install_panic_hook(FaultPolicy::Exit);

    if let Err(e) = run().await {
        tracing::error!(error = %e, "MCP stdio server failed");
        std::process::exit(1);
    }
}
