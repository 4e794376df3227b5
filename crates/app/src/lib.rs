//! Tutorial video catalog and its front ends.
//!
//! The catalog, renderers and tool adapter are shared; each binary under
//! `src/bin` attaches one transport.

pub mod api;
pub mod build;
pub mod bundle;
pub mod catalog;
pub mod config;
pub mod embed;
pub mod error;
pub mod logging;
pub mod player;
pub mod remote;
pub mod tools;
pub mod widgets;

pub use config::Config;
pub use error::AppError;
