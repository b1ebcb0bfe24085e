//! ColorProxyServer: fetches the colour from the colour host and relays it.
//!
//! The colour host can be used as is or resolved through DNS SRV, and the
//! outbound request can be pushed through a local egress listener that routes
//! on the Host header.

use std::sync::Arc;

use clap::{ArgAction, Parser};
use log::info;
use serde::Serialize;

use crate::parser::Method;
use crate::server::{Error, HttpResponse, HttpServer, ServerConfig, StatusCode};
use crate::services::{log_config, parse_flag};
use crate::upstream::{
    parse_resolver_type, relay, ColorHostResolver, RelayPolicy, ResolverType, UpstreamClient, UpstreamResponse,
    UpstreamTarget,
};

/// Configuration for the colour proxy.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "color-proxy")]
#[command(about = "Relays the colour served by the colour host")]
pub struct ColorProxyConfig {
    /// Upstream colour service, `host[:port]`
    #[arg(long, env = "COLOR_HOST")]
    pub color_host: String,

    /// `SRV` to resolve the colour host through DNS SRV; anything else uses it as is
    #[arg(long, env = "RESOLVER_TYPE", default_value = "STATIC", value_parser = parse_resolver_type)]
    pub resolver_type: ResolverType,

    /// Local egress port outbound requests go through; 0 sends them directly
    #[arg(long = "egress-port", env = "PROXY_EGRESS_PORT", default_value_t = 15001)]
    pub egress_port: u16,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Relay the upstream's own success status instead of always answering 200
    #[arg(long = "propagate-status", env = "PROPAGATE_UPSTREAM_STATUS", value_parser = parse_flag, action = ArgAction::Set)]
    pub propagate_status: Option<bool>,
}

impl ColorProxyConfig {
    /// Minimal configuration for `color_host`: static resolution, default
    /// egress port, port 8080.
    pub fn new(color_host: impl Into<String>) -> Self {
        Self {
            color_host: color_host.into(),
            resolver_type: ResolverType::Static,
            egress_port: 15001,
            port: 8080,
            propagate_status: None,
        }
    }

    /// `127.0.0.1:<egress_port>`, or `None` when egress is disabled.
    pub fn egress_address(&self) -> Option<String> {
        (self.egress_port != 0).then(|| format!("127.0.0.1:{}", self.egress_port))
    }

    /// How successful upstream answers are relayed.
    pub fn relay_policy(&self) -> RelayPolicy {
        RelayPolicy::from_flag(self.propagate_status.unwrap_or(false))
    }

    /// Listener settings for this configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::listen_any(self.port, false)
    }
}

/// Everything a colour request needs, shared by the handler.
struct ColorProxy {
    resolver: ColorHostResolver,
    client: UpstreamClient,
    egress: Option<String>,
    policy: RelayPolicy,
}

impl ColorProxy {
    /// Where the next request goes, given the resolved colour host.
    fn target_for(&self, color_host: String) -> UpstreamTarget {
        match &self.egress {
            Some(egress) => UpstreamTarget::through(egress.clone(), "/", color_host),
            None => UpstreamTarget::direct(color_host, "/"),
        }
    }

    async fn fetch_color(&self) -> Result<UpstreamResponse, crate::upstream::Error> {
        let color_host = self.resolver.resolve().await;
        let target = self.target_for(color_host);
        info!(
            "using request_host={}, host_header={}",
            target.authority,
            target.host_header.as_deref().unwrap_or("<none>")
        );
        self.client.get(&target).await
    }

    async fn handle(&self) -> HttpResponse {
        relay(self.fetch_color().await, self.policy)
    }
}

/// Register the colour proxy routes, resolving through `resolver`.
pub async fn build_server(config: &ColorProxyConfig, resolver: ColorHostResolver) -> Result<HttpServer, Error> {
    let proxy = Arc::new(ColorProxy {
        resolver,
        client: UpstreamClient::new()?,
        egress: config.egress_address(),
        policy: config.relay_policy(),
    });

    let server = HttpServer::new(config.server_config());

    server.add_route("/ping", vec![Method::GET], |_req| async {
        Ok(HttpResponse::new(StatusCode::OK))
    }).await;

    server.add_fallback(vec![Method::GET], move |_req| {
        let proxy = proxy.clone();
        async move { Ok(proxy.handle().await) }
    }).await;

    Ok(server)
}

/// Serve until shutdown, resolving SRV records through system DNS.
pub async fn run(config: ColorProxyConfig) -> Result<(), Error> {
    log_config("color-proxy", &config)?;
    let resolver = ColorHostResolver::from_system(config.resolver_type, config.color_host.clone());
    let server = build_server(&config, resolver).await?;
    server.start().await
}
