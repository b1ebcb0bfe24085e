//! ColorServer: answers every path with a fixed colour.

use std::sync::Arc;

use clap::{ArgAction, Parser};
use serde::Serialize;

use crate::parser::Method;
use crate::server::{Error, HttpResponse, HttpServer, ServerConfig, StatusCode};
use crate::services::{log_config, parse_flag};

/// Configuration for the colour server.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "color-server")]
#[command(about = "Answers every request with a configured colour")]
pub struct ColorServerConfig {
    /// Colour returned as the body of every non-ping request
    #[arg(long, env = "COLOR", default_value = "no color!")]
    pub color: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Listen on IPv6 any (`::`) instead of IPv4 any; any non-empty value enables it
    #[arg(long = "use-ipv6", env = "USE_IPV6", value_parser = parse_flag, action = ArgAction::Set)]
    pub use_ipv6: Option<bool>,
}

impl ColorServerConfig {
    /// Whether to bind the IPv6 wildcard address.
    pub fn ipv6(&self) -> bool {
        self.use_ipv6.unwrap_or(false)
    }

    /// Listener settings for this configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::listen_any(self.port, self.ipv6())
    }
}

impl Default for ColorServerConfig {
    fn default() -> Self {
        Self {
            color: "no color!".to_string(),
            port: 8080,
            use_ipv6: None,
        }
    }
}

/// Register the colour server routes.
pub async fn build_server(config: &ColorServerConfig) -> HttpServer {
    let server = HttpServer::new(config.server_config());

    server.add_route("/ping", vec![Method::GET], |_req| async {
        Ok(HttpResponse::new(StatusCode::OK))
    }).await;

    let color: Arc<str> = Arc::from(config.color.as_str());
    server.add_fallback(vec![Method::GET], move |_req| {
        let color = color.clone();
        async move {
            Ok(HttpResponse::new(StatusCode::OK)
                .with_content_type("text/plain")
                .with_body_string(color.as_ref()))
        }
    }).await;

    server
}

/// Serve until shutdown.
pub async fn run(config: ColorServerConfig) -> Result<(), Error> {
    log_config("color-server", &config)?;
    let server = build_server(&config).await;
    server.start().await
}
