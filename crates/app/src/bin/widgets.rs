use tutorial_videos::logging::{self, FaultPolicy, LogTarget};
use tutorial_videos::widgets::{available_widgets, widget_host_router};
use tutorial_videos::{AppError, Config};

async fn run() -> Result<(), AppError> {
    let config = Config::from_env(3001)?;

    for page in available_widgets(&config.widgets_dir) {
        tracing::info!(widget = %page, "available widget");
    }
    let router = widget_host_router(config.widgets_dir.clone());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind { addr: addr.clone(), source })?;
    tracing::info!(addr = %addr, dir = %config.widgets_dir.display(), "widget server listening");

    axum::serve(listener, router)
        .await
        .map_err(|source| AppError::Bind { addr, source })
}

#[tokio::main]
async fn main() {
    logging::init(LogTarget::Stdout);
    logging::install_panic_hook(FaultPolicy::Exit);

    if let Err(e) = run().await {
        tracing::error!(error = %e, "widget server failed");
        std::process::exit(1);
    }
}
