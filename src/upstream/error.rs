//! Error types for upstream calls.

use thiserror::Error;

use crate::server::StatusCode;

/// Errors that can occur while reaching an upstream service.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream answered, but with an error status.
    #[error("Upstream returned {} {reason}", .status.as_u16())]
    Status {
        /// The status the upstream sent.
        status: StatusCode,
        /// The reason phrase for that status.
        reason: String,
    },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The DNS query itself failed.
    #[error("SRV lookup failed: {0}")]
    Lookup(#[from] hickory_resolver::error::ResolveError),

    /// The DNS query succeeded but returned no records.
    #[error("No SRV records for {0}")]
    NoSrvRecords(String),
}
