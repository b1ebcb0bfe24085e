//! Colour-host resolution.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use log::{info, warn};
use serde::Serialize;

use crate::upstream::error::Error;

/// How the configured colour host is turned into a dispatch host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolverType {
    /// Use the configured host as is.
    Static,
    /// Look up SRV records for the host name.
    Srv,
}

impl fmt::Display for ResolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverType::Static => write!(f, "STATIC"),
            ResolverType::Srv => write!(f, "SRV"),
        }
    }
}

/// Parse a resolver type. Anything other than `SRV` means static.
pub fn parse_resolver_type(value: &str) -> Result<ResolverType, String> {
    Ok(match value {
        "SRV" => ResolverType::Srv,
        _ => ResolverType::Static,
    })
}

/// One SRV answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Target host name, possibly fully qualified with a trailing dot.
    pub target: String,
    /// Target port.
    pub port: u16,
}

impl SrvRecord {
    /// `target:port`, without the root dot.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.target.trim_end_matches('.'), self.port)
    }
}

/// Boxed future returned by [`SrvLookup::lookup_srv`].
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<SrvRecord>, Error>> + Send + 'a>>;

/// Source of SRV records.
pub trait SrvLookup: Send + Sync {
    /// Query SRV records for `name`, in answer order.
    fn lookup_srv<'a>(&'a self, name: &'a str) -> LookupFuture<'a>;
}

/// [`SrvLookup`] backed by the system DNS resolver.
pub struct DnsSrvLookup {
    resolver: TokioAsyncResolver,
}

impl DnsSrvLookup {
    /// Use the system resolver configuration, or public defaults if it cannot be read.
    pub fn from_system_conf() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!("Could not read system resolver configuration ({e}), using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

impl SrvLookup for DnsSrvLookup {
    fn lookup_srv<'a>(&'a self, name: &'a str) -> LookupFuture<'a> {
        Box::pin(async move {
            let lookup = self.resolver.srv_lookup(name).await?;
            let records: Vec<SrvRecord> = lookup
                .iter()
                .map(|srv| SrvRecord {
                    target: srv.target().to_utf8(),
                    port: srv.port(),
                })
                .collect();

            if records.is_empty() {
                return Err(Error::NoSrvRecords(name.to_string()));
            }
            Ok(records)
        })
    }
}

/// Resolves the configured colour host on every request.
#[derive(Clone)]
pub struct ColorHostResolver {
    resolver_type: ResolverType,
    color_host: String,
    lookup: Option<Arc<dyn SrvLookup>>,
}

impl ColorHostResolver {
    /// Create a resolver. `lookup` is only consulted in SRV mode.
    pub fn new(resolver_type: ResolverType, color_host: impl Into<String>, lookup: Option<Arc<dyn SrvLookup>>) -> Self {
        Self {
            resolver_type,
            color_host: color_host.into(),
            lookup,
        }
    }

    /// Create a resolver that uses system DNS in SRV mode.
    pub fn from_system(resolver_type: ResolverType, color_host: impl Into<String>) -> Self {
        let lookup: Option<Arc<dyn SrvLookup>> = match resolver_type {
            ResolverType::Srv => Some(Arc::new(DnsSrvLookup::from_system_conf())),
            ResolverType::Static => None,
        };
        Self::new(resolver_type, color_host, lookup)
    }

    /// The configured colour host.
    pub fn color_host(&self) -> &str {
        &self.color_host
    }

    /// Name sent in the SRV query: the colour host without its port.
    pub fn query_name(&self) -> &str {
        self.color_host
            .split_once(':')
            .map_or(self.color_host.as_str(), |(host, _)| host)
    }

    /// The host to dispatch to.
    ///
    /// In SRV mode the first record wins. Lookup failures are logged and
    /// resolve to the configured colour host.
    pub async fn resolve(&self) -> String {
        if self.resolver_type != ResolverType::Srv {
            return self.color_host.clone();
        }

        let Some(lookup) = &self.lookup else {
            warn!("SRV resolution requested without a DNS lookup, using {}", self.color_host);
            return self.color_host.clone();
        };

        match lookup.lookup_srv(self.query_name()).await {
            Ok(records) => match records.first() {
                Some(record) => {
                    info!("Record = {record:?}");
                    record.authority()
                }
                None => {
                    info!("SRV lookup for {} returned no records, using {}", self.query_name(), self.color_host);
                    self.color_host.clone()
                }
            },
            Err(e) => {
                info!("error using SRV lookup {e}, using {}", self.color_host);
                self.color_host.clone()
            }
        }
    }
}
