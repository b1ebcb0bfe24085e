//! Turning an upstream outcome into the caller's response.

use log::error;

use crate::server::{HttpResponse, StatusCode};
use crate::upstream::client::UpstreamResponse;
use crate::upstream::error::Error;

/// Body sent when the upstream could not be reached at all.
pub const FAILURE_BODY: &str = "Something really bad happened";

/// Which status a successful upstream answer is relayed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayPolicy {
    /// Always answer 200, whatever success status the upstream used.
    #[default]
    AlwaysOk,
    /// Answer with the upstream's own status.
    MirrorStatus,
}

impl RelayPolicy {
    /// `MirrorStatus` when `propagate` is set, `AlwaysOk` otherwise.
    pub fn from_flag(propagate: bool) -> Self {
        if propagate {
            RelayPolicy::MirrorStatus
        } else {
            RelayPolicy::AlwaysOk
        }
    }
}

/// Map the result of an upstream GET to the response for the caller.
///
/// Error statuses from the upstream are passed through with their reason
/// phrase. Transport failures become a 500 with [`FAILURE_BODY`].
pub fn relay(outcome: Result<UpstreamResponse, Error>, policy: RelayPolicy) -> HttpResponse {
    match outcome {
        Ok(upstream) => {
            let status = match policy {
                RelayPolicy::AlwaysOk => StatusCode::OK,
                RelayPolicy::MirrorStatus => upstream.status,
            };
            HttpResponse::new(status).with_body_bytes(upstream.body)
        }
        Err(Error::Status { status, reason }) => {
            error!("Upstream answered {} {reason}", status.as_u16());
            HttpResponse::new(status)
                .with_reason(reason.clone())
                .with_content_type("text/plain")
                .with_body_string(format!("{} {reason}", status.as_u16()))
        }
        Err(e) => {
            error!("{e:?}");
            HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .with_content_type("text/plain")
                .with_body_string(FAILURE_BODY)
        }
    }
}
