//! HTTP server for the colorapp services.
//!
//! A deliberately small server: one connection at a time, one request per
//! connection, exact-path routes plus an optional fallback route.

mod response;
mod config;
mod error;
mod handler;
mod http_server;
mod tests;

pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{PathPattern, Route};
pub use http_server::HttpServer;
