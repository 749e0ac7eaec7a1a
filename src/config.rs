//! Configuration utilities re-exported at the crate root.
//!
//! This exposes [`ConnectionConfig`] so applications can load settings
//! from `config/config.toml` or `SOMMY__DATABASE__*` environment variables
//! using `ConnectionConfig::load()`.

pub use crate::connection::config::*;
