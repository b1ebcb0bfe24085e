//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// A parsed request head.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The request method.
    pub method: Method,
    /// The request target exactly as sent, query string included.
    pub path: String,
    /// The protocol version.
    pub version: HttpVersion,
    /// Header names as sent, mapped to trimmed values.
    pub headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a request from its parsed parts.
    pub fn new(method: Method, path: impl Into<String>, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        Self {
            method,
            path: path.into(),
            version,
            headers,
        }
    }

    /// Look up a header value, ignoring the case of the name.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }
}

/// Returns true once `input` contains the blank line that ends a request head.
pub fn header_block_complete(input: &[u8]) -> bool {
    head_len(input).is_some()
}

/// Length of the request head, terminator excluded, if the head is complete.
fn head_len(input: &[u8]) -> Option<usize> {
    let crlf = input.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = input.windows(2).position(|w| w == b"\n\n");
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Parse a request head from raw bytes.
///
/// Anything after the blank line ending the headers is ignored.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let head = &input[..head_len(input).unwrap_or(input.len())];
    let text = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;
    let mut lines = text.lines();

    let request_line = lines.next().ok_or(Error::EmptyRequest)?;
    let (method, path, version) = parse_request_line(request_line)?;

    let mut headers = HashMap::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        let (name, value) = parse_header_line(line)?;
        headers.insert(name, value);
    }

    Ok(HttpRequest::new(method, path, version, headers))
}

fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(line.to_string()));
    };

    let method = Method::from_str(method)?;
    if !path.starts_with('/') {
        return Err(Error::InvalidPath(path.to_string()));
    }
    let version = HttpVersion::from_str(version)?;

    Ok((method, path.to_string(), version))
}

fn parse_header_line(line: &str) -> Result<(String, String), Error> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeaderFormat(line.to_string()));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
