use std::sync::Arc;

use mcpserver::SseOptions;
use tutorial_videos::logging::{self, FaultPolicy, LogTarget};
use tutorial_videos::remote::{remote_router, RemoteOptions, SERVER_NAME};
use tutorial_videos::tools::{build_server, ListingStyle, ToolOptions, WidgetDelivery};
use tutorial_videos::{AppError, Config};

async fn run() -> Result<(), AppError> {
    let config = Config::from_env(3000)?;

    let srv = build_server(
        "gradeless-tutorial-videos",
        env!("CARGO_PKG_VERSION"),
        ToolOptions {
            listing: ListingStyle::default(),
            delivery: WidgetDelivery::Hosted {
                base_url: config.base_url.clone(),
            },
        },
    );

    let (router, _sse) = remote_router(
        Arc::new(srv),
        RemoteOptions {
            base_url: config.base_url.clone(),
            widgets_dir: config.widgets_dir.clone(),
            sse: SseOptions {
                expose_error_details: config.expose_error_details,
                ..SseOptions::default()
            },
        },
    );

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind { addr: addr.clone(), source })?;

    tracing::info!(addr = %addr, name = SERVER_NAME, "remote MCP server listening");
    tracing::info!(endpoint = %format!("{}/sse", config.base_url), "MCP SSE endpoint");
    tracing::info!(endpoint = %format!("{}/widgets", config.base_url), "widget endpoint");

    axum::serve(listener, router)
        .await
        .map_err(|source| AppError::Bind { addr, source })
}

#[tokio::main]
async fn main() {
    logging::init(LogTarget::Stdout);
    // One session's fault must not take down the others.
    logging::install_panic_hook(FaultPolicy::Continue);

    if let Err(e) = run().await {
        tracing::error!(error = %e, "remote MCP server failed");
        std::process::exit(1);
    }
}
