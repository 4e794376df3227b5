use std::path::Path;
use std::sync::Arc;

/// The bundled player script, read once at startup.
///
/// A failed read leaves the cache empty for the lifetime of the process;
/// there is no retry and no reload.
#[derive(Debug, Clone, Default)]
pub struct BundleCache {
    script: Option<Arc<str>>,
}

impl BundleCache {
    /// Read the bundle from `path`, logging the outcome.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(script) => {
                tracing::info!(path = %path.display(), bytes = script.len(), "player bundle loaded");
                Self {
                    script: Some(script.into()),
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not load player bundle; run tutorial-build"
                );
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { script: None }
    }

    pub fn with_script(script: impl Into<Arc<str>>) -> Self {
        Self {
            script: Some(script.into()),
        }
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.script.is_some()
    }
}
