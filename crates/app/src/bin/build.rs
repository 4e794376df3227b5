//! Asset build: `tutorial-build [ROOT]`, ROOT defaulting to the current
//! directory.

use tutorial_videos::build::{run_all, BuildPaths};
use tutorial_videos::logging::{self, FaultPolicy, LogTarget};
use tutorial_videos::AppError;

fn run() -> Result<(), AppError> {
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".into());
    let paths = BuildPaths::from_root(&root);

    tracing::info!(entry = %paths.entry.display(), "building web component");
    let (bundle, widgets) = run_all(&paths)?;

    tracing::info!(
        output = %bundle.script_path.display(),
        map = %bundle.map_path.display(),
        modules = bundle.modules.len(),
        "web component built"
    );
    tracing::info!(count = widgets.len(), output = %paths.widgets_out.display(), "widgets built");
    Ok(())
}

fn main() {
    logging::init(LogTarget::Stdout);
    logging::install_panic_hook(FaultPolicy::Exit);

    if let Err(e) = run() {
        tracing::error!(error = %e, "build failed");
        std::process::exit(1);
    }
}
