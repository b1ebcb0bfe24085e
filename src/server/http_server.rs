//! HTTP server implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::signal;
use log::{debug, info, warn, error};

use crate::parser::{HttpRequest, Method, header_block_complete, parse_request};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{PathPattern, Route, matching_routes};
use crate::server::response::{HttpResponse, StatusCode};

/// An HTTP server that handles one connection at a time.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The routes.
    pub routes: Arc<RwLock<Vec<Route>>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add an exact-path route to the server.
    pub async fn add_route<F, Fut>(&self, path: impl Into<String>, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.push_route(PathPattern::Exact(path.into()), methods, handler).await;
    }

    /// Add a route answering every path no exact route claims.
    pub async fn add_fallback<F, Fut>(&self, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.push_route(PathPattern::Fallback, methods, handler).await;
    }

    async fn push_route<F, Fut>(&self, pattern: PathPattern, methods: Vec<Method>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let handler = Arc::new(move |req: HttpRequest| -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>> {
            Box::pin(handler(req))
        });

        let route = Route {
            pattern,
            methods,
            handler,
        };

        self.routes.write().await.push(route);
    }

    /// Log the registered endpoints.
    async fn display_server_info(&self) {
        let routes = self.routes.read().await;
        info!("Registered endpoints:");
        for route in routes.iter() {
            let methods = route.methods.iter()
                .map(|m| format!("{m}"))
                .collect::<Vec<String>>()
                .join(", ");
            info!("  {methods} {}", route.pattern);
        }
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);
        Ok(listener)
    }

    /// Handle accept errors. Returns true if the loop should stop.
    async fn handle_accept_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Accept and serve connections one after another until Ctrl+C.
    ///
    /// Each connection, including any upstream call its handler makes, is
    /// finished before the next one is accepted.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        self.display_server_info().await;

        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    result?;
                    info!("Received Ctrl+C, shutting down server");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((mut socket, addr)) => {
                            debug!("Accepted connection from {addr}");
                            if let Err(e) = Self::handle_connection(
                                &mut socket,
                                self.routes.clone(),
                                self.config.read_buffer_size,
                            ).await {
                                warn!("Error handling connection from {addr}: {e}");
                            }
                        }
                        Err(e) => {
                            if Self::handle_accept_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Read one request head, stopping at the blank line, a full buffer or EOF.
    async fn read_request_head(
        socket: &mut (impl AsyncRead + Unpin),
        read_buffer_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; read_buffer_size];
        let mut filled = 0;

        while filled < buf.len() {
            let n = socket.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
            if header_block_complete(&buf[..filled]) {
                break;
            }
        }

        buf.truncate(filled);
        Ok(buf)
    }

    async fn write_response(
        socket: &mut (impl AsyncWrite + Unpin),
        response: HttpResponse,
    ) -> Result<(), Error> {
        let response = response.with_header("Connection", "close");
        socket.write_all(&response.to_bytes()).await?;
        socket.flush().await?;
        Ok(())
    }

    /// Handle a single connection: one request, one response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        routes: Arc<RwLock<Vec<Route>>>,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let head = Self::read_request_head(socket, read_buffer_size).await?;
        if head.is_empty() {
            return Ok(()); // Connection closed
        }

        let request = match parse_request(&head) {
            Ok(req) => req,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::BAD_REQUEST)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Error parsing request: {e}"));
                Self::write_response(socket, response).await?;
                return Err(Error::ParseError(e));
            }
        };

        let handler = {
            let routes_guard = routes.read().await;
            let candidates = matching_routes(&routes_guard, &request.path);

            if candidates.is_empty() {
                let response = HttpResponse::new(StatusCode::NOT_FOUND)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Not found: {path}", path = request.path));
                Self::write_response(socket, response).await?;
                return Err(Error::NotFound(request.path));
            }

            let Some(route) = candidates
                .iter()
                .find(|route| route.methods.contains(&request.method))
            else {
                let mut allowed: Vec<String> = Vec::new();
                for method in candidates.iter().flat_map(|route| route.methods.iter()) {
                    let method = method.to_string();
                    if !allowed.contains(&method) {
                        allowed.push(method);
                    }
                }
                let allowed = allowed.join(", ");

                let response = HttpResponse::new(StatusCode::METHOD_NOT_ALLOWED)
                    .with_header("Allow", allowed.clone())
                    .with_content_type("text/plain")
                    .with_body_string(format!(
                        "Method {method} not allowed for path: {path}. Allowed methods: {allowed}",
                        method = request.method,
                        path = request.path,
                    ));
                Self::write_response(socket, response).await?;
                return Err(Error::MethodNotAllowed(request.method, request.path));
            };

            route.handler.clone()
        };

        match handler(request).await {
            Ok(response) => Self::write_response(socket, response).await,
            Err(e) => {
                let response = HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_content_type("text/plain")
                    .with_body_string(format!("Internal server error: {e}"));
                Self::write_response(socket, response).await?;
                Err(e)
            }
        }
    }
}
