//! Process configuration read from the environment.

use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_BUNDLE_PATH: &str = "web/dist/tutorial-video-player.js";
pub const DEFAULT_WIDGETS_DIR: &str = "widgets/assets";

/// Settings shared by all front ends. Each binary reads the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Externally reachable base URL of this server.
    pub base_url: String,
    /// Base URL of a separate widget host. When set, the stdio server links
    /// to hosted widget pages instead of inlining the bundle.
    pub widget_url: Option<String>,
    /// Include internal error detail in error responses.
    pub expose_error_details: bool,
    pub bundle_path: PathBuf,
    pub widgets_dir: PathBuf,
}

impl Config {
    /// Read the process environment, with `default_port` when `PORT` is unset.
    pub fn from_env(default_port: u16) -> Result<Self, AppError> {
        Self::from_lookup(default_port, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(default_port: u16, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("invalid PORT {:?}: {}", raw, e)))?,
            None => default_port,
        };

        let base_url = get("BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        let widget_url = get("WIDGET_URL").map(|u| u.trim().trim_end_matches('/').to_string());

        Ok(Self {
            port,
            base_url,
            widget_url,
            expose_error_details: get("NODE_ENV").as_deref() == Some("development"),
            bundle_path: get("BUNDLE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_PATH)),
            widgets_dir: get("WIDGETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WIDGETS_DIR)),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
