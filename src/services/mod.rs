//! The three demo services.
//!
//! Each module owns a configuration struct read once at startup from flags
//! and environment variables, a `build_server` that registers its routes,
//! and a `run` that binds and serves.

pub mod color;
pub mod color_proxy;
pub mod diagnostic_proxy;

use log::info;
use serde::Serialize;

use crate::server::Error;

/// Parse a boolean switch: any non-empty value turns it on.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(!value.is_empty())
}

/// Log a service configuration as one JSON line.
pub(crate) fn log_config<T: Serialize>(service: &str, config: &T) -> Result<(), Error> {
    let rendered = serde_json::to_string(config)?;
    info!("{service} configuration: {rendered}");
    Ok(())
}
