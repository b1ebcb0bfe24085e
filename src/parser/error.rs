//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while parsing an incoming request.
#[derive(Debug, Error)]
pub enum Error {
    /// The request method is not one the server understands.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request target is missing or does not start with `/`.
    #[error("Invalid HTTP path: {0}")]
    InvalidPath(String),

    /// The request line does not have exactly three parts.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The protocol version is not HTTP/1.0 or HTTP/1.1.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A header line has no `:` separator or an empty name.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    /// Nothing was received before the connection closed.
    #[error("Empty request")]
    EmptyRequest,
}
