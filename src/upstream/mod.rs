//! Outbound side of the proxy services.
//!
//! [`UpstreamClient`] issues the GET, [`ColorHostResolver`] decides which host
//! it goes to, and [`relay`] turns the outcome into the response the caller
//! sees.

mod client;
mod error;
mod relay;
mod resolver;

pub use client::{UpstreamClient, UpstreamResponse, UpstreamTarget};
pub use error::Error;
pub use relay::{relay, RelayPolicy, FAILURE_BODY};
pub use resolver::{
    parse_resolver_type, ColorHostResolver, DnsSrvLookup, LookupFuture, ResolverType, SrvLookup, SrvRecord,
};
