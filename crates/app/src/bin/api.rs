use tutorial_videos::api::{api_router, ApiState, ENDPOINTS};
use tutorial_videos::bundle::BundleCache;
use tutorial_videos::logging::{self, FaultPolicy, LogTarget};
use tutorial_videos::{AppError, Config};

async fn run() -> Result<(), AppError> {
    let config = Config::from_env(3000)?;
    let bundle = BundleCache::load(&config.bundle_path).await;

    let router = api_router(ApiState { bundle });
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind { addr: addr.clone(), source })?;

    tracing::info!(addr = %addr, "tutorial video API listening");
    for (route, what) in ENDPOINTS {
        tracing::info!(route, what, "endpoint");
    }

    axum::serve(listener, router)
        .await
        .map_err(|source| AppError::Bind { addr, source })
}

#[tokio::main]
async fn main() {
    logging::init(LogTarget::Stdout);
    logging::install_panic_hook(FaultPolicy::Exit);

    if let Err(e) = run().await {
        tracing::error!(error = %e, "tutorial API failed");
        std::process::exit(1);
    }
}
