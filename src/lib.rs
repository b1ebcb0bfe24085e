//! Small HTTP services for networking walkthroughs.
//!
//! The crate backs three binaries:
//!
//! - `color-server` answers every path with a configured colour and can bind
//!   the IPv6 wildcard address.
//! - `color-proxy` fetches the colour from a colour host, optionally resolving
//!   it through DNS SRV and sending the request through a local egress port.
//! - `diagnostic-proxy` relays the colour host and exposes the sidecar admin
//!   `/config_dump` of both ends.
//!
//! All three answer `GET /ping` with an empty 200.
//!
//! # Examples
//!
//! ```
//! use colorapp::parse_request;
//!
//! let request = parse_request(b"GET /ping HTTP/1.1\r\nHost: color.local\r\n\r\n").unwrap();
//! assert_eq!(request.path, "/ping");
//! ```
//!
//! ```
//! use colorapp::{HttpResponse, StatusCode};
//!
//! let response = HttpResponse::new(StatusCode::NOT_FOUND).with_reason("No Such Colour");
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 404 No Such Colour\r\n"));
//! ```

pub mod parser;
pub mod server;
pub mod services;
pub mod upstream;

#[cfg(test)]
mod test_support;

pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
pub use upstream::Error as UpstreamError;
