//! HTTP request handlers and routing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::{HttpRequest, Method};
use crate::server::{HttpResponse, Error};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// Which request targets a route answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// The request target must equal this string, query string included.
    Exact(String),
    /// Any target not claimed by an exact route.
    Fallback,
}

impl PathPattern {
    /// Whether this pattern accepts `path`.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(expected) => expected == path,
            PathPattern::Fallback => true,
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Exact(path) => f.write_str(path),
            PathPattern::Fallback => f.write_str("/*"),
        }
    }
}

/// Represents a route in the HTTP server.
pub struct Route {
    /// The paths to match.
    pub pattern: PathPattern,
    /// The HTTP methods to match.
    pub methods: Vec<Method>,
    /// The handler function.
    pub handler: HandlerFn,
}

/// Routes that claim `path`: the exact matches if there are any, otherwise the fallbacks.
pub fn matching_routes<'a>(routes: &'a [Route], path: &str) -> Vec<&'a Route> {
    let exact: Vec<&Route> = routes
        .iter()
        .filter(|route| matches!(route.pattern, PathPattern::Exact(_)) && route.pattern.matches(path))
        .collect();

    if !exact.is_empty() {
        return exact;
    }

    routes
        .iter()
        .filter(|route| route.pattern == PathPattern::Fallback)
        .collect()
}
