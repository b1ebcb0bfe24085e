//! Outbound HTTP client.

use hyper::ext::ReasonPhrase;
use log::debug;
use reqwest::header::HOST;

use crate::server::StatusCode;
use crate::upstream::error::Error;

/// Where an outbound GET is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    /// `host[:port]` the TCP connection is opened to.
    pub authority: String,
    /// Request path, starting with `/`.
    pub path: String,
    /// Host header to send instead of `authority`, if any.
    pub host_header: Option<String>,
}

impl UpstreamTarget {
    /// Send straight to `authority`.
    pub fn direct(authority: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            path: path.into(),
            host_header: None,
        }
    }

    /// Connect to `via` while addressing the request to `host`.
    ///
    /// This is how traffic is handed to a local egress listener that routes
    /// on the Host header.
    pub fn through(via: impl Into<String>, path: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            authority: via.into(),
            path: path.into(),
            host_header: Some(host.into()),
        }
    }

    /// The URL requested.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.authority, self.path)
    }
}

/// A successful upstream answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// The status the upstream sent, always below 400.
    pub status: StatusCode,
    /// The response body, unmodified.
    pub body: Vec<u8>,
}

/// Plain-HTTP client for upstream GETs.
///
/// Redirects are followed. There is no timeout and no retry.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client that ignores proxy environment variables.
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { client })
    }

    /// GET `target`.
    ///
    /// Statuses of 400 and above come back as [`Error::Status`]; anything that
    /// prevents reading a full response comes back as [`Error::Transport`].
    pub async fn get(&self, target: &UpstreamTarget) -> Result<UpstreamResponse, Error> {
        let mut request = self.client.get(target.url());
        if let Some(host) = &target.host_header {
            request = request.header(HOST, host.as_str());
        }

        let response = request.send().await?;
        let upstream_status = response.status();
        debug!("{} answered {upstream_status}", target.url());

        let status = StatusCode::from_u16(upstream_status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if status.is_error() {
            // hyper only records the phrase when it differs from the canonical one.
            let reason = match response.extensions().get::<ReasonPhrase>() {
                Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
                None => upstream_status
                    .canonical_reason()
                    .unwrap_or_else(|| status.reason_phrase())
                    .to_string(),
            };
            return Err(Error::Status { status, reason });
        }

        let body = response.bytes().await?.to_vec();
        Ok(UpstreamResponse { status, body })
    }
}
