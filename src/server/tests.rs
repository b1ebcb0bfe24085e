//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::parser::Method;
    use crate::server::{Error, HttpResponse, HttpServer, PathPattern, ServerConfig, StatusCode};
    use crate::test_support::MockTcpStream;

    async fn server_with_test_route() -> HttpServer {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/test", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::OK)
                .with_content_type("text/plain")
                .with_body_string("Test response"))
        }).await;
        server
    }

    #[tokio::test]
    async fn test_server_creation() {
        let config = ServerConfig {
            addr: "127.0.0.1:9090".parse().unwrap(),
            read_buffer_size: 4096,
        };

        let server = HttpServer::new(config.clone());
        assert_eq!(server.config.addr, config.addr);
        assert_eq!(server.config.read_buffer_size, 4096);
    }

    #[test]
    fn test_listen_any_address_families() {
        let v4 = ServerConfig::listen_any(8080, false);
        assert_eq!(v4.addr.to_string(), "0.0.0.0:8080");

        let v6 = ServerConfig::listen_any(8080, true);
        assert_eq!(v6.addr.to_string(), "[::]:8080");
        assert!(v6.addr.is_ipv6());
    }

    #[tokio::test]
    async fn test_add_route_and_fallback() {
        let server = server_with_test_route().await;
        server.add_fallback(vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::OK))
        }).await;

        let routes = server.routes.read().await;
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].pattern, PathPattern::Exact("/test".to_string()));
        assert_eq!(routes[1].pattern, PathPattern::Fallback);
        assert_eq!(routes[1].methods, vec![Method::GET]);
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let mut stream = MockTcpStream::new(b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        let server = server_with_test_route().await;

        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(result.is_ok());

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert!(response.contains("Connection: close\r\n"));
        assert!(response.ends_with("\r\n\r\nTest response"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let mut stream = MockTcpStream::new(b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        let server = server_with_test_route().await;

        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::NotFound(ref p)) if p == "/nonexistent"));

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Not found: /nonexistent"));
    }

    #[tokio::test]
    async fn test_fallback_catches_unknown_paths() {
        let server = server_with_test_route().await;
        server.add_fallback(vec![Method::GET], |req| async move {
            Ok(HttpResponse::new(StatusCode::OK).with_body_string(format!("fallback {}", req.path)))
        }).await;

        let mut stream = MockTcpStream::new(b"GET /anything/else HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await.unwrap();
        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.ends_with("fallback /anything/else"));

        let mut stream = MockTcpStream::new(b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await.unwrap();
        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.ends_with("Test response"));
    }

    #[tokio::test]
    async fn test_exact_route_wins_over_earlier_fallback() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_fallback(vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::OK).with_body_string("fallback"))
        }).await;
        server.add_route("/ping", vec![Method::GET], |_req| async {
            Ok(HttpResponse::new(StatusCode::OK))
        }).await;

        let mut stream = MockTcpStream::new(b"GET /ping HTTP/1.0\r\n\r\n".to_vec());
        HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await.unwrap();
        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.contains("Content-Length: 0\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_method_not_allowed() {
        let mut stream = MockTcpStream::new(b"POST /test HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        let server = server_with_test_route().await;

        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::MethodNotAllowed(Method::POST, _))));

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(response.contains("Method POST not allowed for path: /test"));
        assert!(response.contains("Allow: GET\r\n"));
    }

    #[tokio::test]
    async fn test_unrouted_head_and_unknown_methods_still_answer() {
        let server = server_with_test_route().await;

        let mut stream = MockTcpStream::new(b"HEAD /test HTTP/1.1\r\n\r\n".to_vec());
        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::MethodNotAllowed(Method::HEAD, _))));
        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(response.contains("Allow: GET\r\n"));

        let mut stream = MockTcpStream::new(b"BREW /test HTTP/1.1\r\n\r\n".to_vec());
        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::ParseError(_))));
        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_invalid_request() {
        let mut stream = MockTcpStream::new(b"INVALID REQUEST".to_vec());
        let server = HttpServer::new(ServerConfig::default());

        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::ParseError(_))));

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.contains("Error parsing request:"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_empty_stream() {
        let mut stream = MockTcpStream::new(Vec::new());
        let server = server_with_test_route().await;

        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(result.is_ok());
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_becomes_internal_server_error() {
        let server = HttpServer::new(ServerConfig::default());
        server.add_route("/broken", vec![Method::GET], |_req| async {
            Err(Error::InternalError("colour missing".to_string()))
        }).await;

        let mut stream = MockTcpStream::new(b"GET /broken HTTP/1.1\r\nHost: localhost\r\n\r\n".to_vec());
        let result = HttpServer::handle_connection(&mut stream, server.routes.clone(), 1024).await;
        assert!(matches!(result, Err(Error::InternalError(_))));

        let response = String::from_utf8_lossy(stream.written_data());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.contains("Internal server error: colour missing"));
    }

    #[test]
    fn test_response_reason_override() {
        let response = HttpResponse::new(StatusCode::NOT_FOUND).with_reason("Gone\r\nX-Injected: 1");
        let bytes = String::from_utf8(response.to_bytes()).unwrap();
        assert!(bytes.starts_with("HTTP/1.1 404 Gone  X-Injected: 1\r\n"));
    }

    #[test]
    fn test_status_code_range() {
        assert_eq!(StatusCode::from_u16(418).map(|s| s.as_u16()), Some(418));
        assert_eq!(StatusCode::from_u16(418).unwrap().reason_phrase(), "Unknown");
        assert!(StatusCode::from_u16(42).is_none());
        assert!(StatusCode::from_u16(1000).is_none());
        assert!(StatusCode::NOT_FOUND.is_error());
        assert!(!StatusCode::OK.is_error());
    }

    #[tokio::test]
    async fn test_serve_handles_connections_one_after_another() {
        let server = server_with_test_route().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move { server.serve(listener).await });

        for _ in 0..2 {
            let mut client = TcpStream::connect(addr).await.unwrap();
            client.write_all(b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

            let mut response = String::new();
            tokio::time::timeout(Duration::from_secs(5), client.read_to_string(&mut response))
                .await
                .unwrap()
                .unwrap();
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
            assert!(response.ends_with("Test response"));
        }

        task.abort();
    }
}
