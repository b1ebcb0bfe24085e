//! HTTP request parsing.
//!
//! Only the request line and the header block are parsed; none of the
//! services read request bodies.

mod request;
mod method;
mod version;
mod error;

pub use request::{HttpRequest, parse_request, header_block_complete};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
