//! DiagnosticProxyServer: relays the colour host and exposes sidecar config dumps.

use std::sync::Arc;

use clap::{ArgAction, Parser};
use serde::Serialize;

use crate::parser::{HttpRequest, Method};
use crate::server::{Error, HttpResponse, HttpServer, ServerConfig, StatusCode};
use crate::services::{log_config, parse_flag};
use crate::upstream::{relay, RelayPolicy, UpstreamClient, UpstreamTarget};

/// Configuration for the diagnostic proxy.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "diagnostic-proxy")]
#[command(about = "Relays the colour host and the sidecar admin config dumps")]
pub struct DiagnosticProxyConfig {
    /// Upstream colour service, `host[:port]`
    #[arg(long, env = "COLOR_HOST")]
    pub color_host: String,

    /// Local sidecar admin endpoint serving `/config_dump`
    #[arg(long, env = "ADMIN_HOST", default_value = "localhost:9901")]
    pub admin_host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Relay the upstream's own success status instead of always answering 200
    #[arg(long = "propagate-status", env = "PROPAGATE_UPSTREAM_STATUS", value_parser = parse_flag, action = ArgAction::Set)]
    pub propagate_status: Option<bool>,
}

impl DiagnosticProxyConfig {
    /// Configuration for `color_host` with every other setting at its default.
    pub fn new(color_host: impl Into<String>) -> Self {
        Self {
            color_host: color_host.into(),
            admin_host: "localhost:9901".to_string(),
            port: 8080,
            propagate_status: None,
        }
    }

    /// Listener settings for this configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::listen_any(self.port, false)
    }
}

/// Register a GET route that relays `target`.
async fn add_relay_route(
    server: &HttpServer,
    path: Option<&str>,
    client: &UpstreamClient,
    target: UpstreamTarget,
    policy: RelayPolicy,
) {
    let client = client.clone();
    let target = Arc::new(target);
    let handler = move |_req: HttpRequest| {
        let client = client.clone();
        let target = target.clone();
        async move { Ok::<_, Error>(relay(client.get(&target).await, policy)) }
    };

    match path {
        Some(path) => server.add_route(path, vec![Method::GET], handler).await,
        None => server.add_fallback(vec![Method::GET], handler).await,
    }
}

/// Register the diagnostic proxy routes.
pub async fn build_server(config: &DiagnosticProxyConfig) -> Result<HttpServer, Error> {
    let client = UpstreamClient::new()?;
    let policy = RelayPolicy::from_flag(config.propagate_status.unwrap_or(false));
    let server = HttpServer::new(config.server_config());

    server.add_route("/ping", vec![Method::GET], |_req| async {
        Ok(HttpResponse::new(StatusCode::OK))
    }).await;

    add_relay_route(
        &server,
        Some("/config_dump"),
        &client,
        UpstreamTarget::direct(config.admin_host.clone(), "/config_dump"),
        policy,
    ).await;

    add_relay_route(
        &server,
        Some("/color/config_dump"),
        &client,
        UpstreamTarget::direct(config.color_host.clone(), "/config_dump"),
        policy,
    ).await;

    add_relay_route(
        &server,
        None,
        &client,
        UpstreamTarget::direct(config.color_host.clone(), "/"),
        policy,
    ).await;

    Ok(server)
}

/// Serve until shutdown.
pub async fn run(config: DiagnosticProxyConfig) -> Result<(), Error> {
    log_config("diagnostic-proxy", &config)?;
    let server = build_server(&config).await?;
    server.start().await
}
