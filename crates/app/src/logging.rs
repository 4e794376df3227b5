//! Tracing setup and process-level fault handling.

use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// Required when stdout carries protocol frames.
    Stderr,
}

/// What happens after a panic has been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Log, then exit with status 1.
    Exit,
    /// Log only; the faulting task dies, the process keeps serving.
    Continue,
}

/// Initialise the global subscriber. `RUST_LOG` filters (default `info`),
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init(target: LogTarget) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let result = match (target, json) {
        (LogTarget::Stdout, false) => builder.try_init(),
        (LogTarget::Stdout, true) => builder.json().try_init(),
        (LogTarget::Stderr, false) => builder.with_writer(std::io::stderr).try_init(),
        (LogTarget::Stderr, true) => builder.json().with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}

/// Route panics through tracing and apply `policy`.
pub fn install_panic_hook(policy: FaultPolicy) {
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());

        tracing::error!(%location, panic = %payload, "unhandled fault");
        if policy == FaultPolicy::Exit {
            std::process::exit(1);
        }
    }));
}
