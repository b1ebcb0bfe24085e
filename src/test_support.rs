//! Shared fixtures for the unit tests.

use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::server::HttpServer;

/// In-memory socket: reads come from a fixed buffer, writes are captured.
pub struct MockTcpStream {
    read_data: Cursor<Vec<u8>>,
    write_data: Vec<u8>,
}

impl MockTcpStream {
    pub fn new(read_data: Vec<u8>) -> Self {
        Self {
            read_data: Cursor::new(read_data),
            write_data: Vec::new(),
        }
    }

    pub fn written_data(&self) -> &[u8] {
        &self.write_data
    }
}

impl AsyncRead for MockTcpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockTcpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Push `request` through `server`'s routes and return the raw response text.
pub async fn exchange(server: &HttpServer, request: &str) -> String {
    let mut stream = MockTcpStream::new(request.as_bytes().to_vec());
    let _ = HttpServer::handle_connection(&mut stream, server.routes.clone(), 8192).await;
    String::from_utf8_lossy(stream.written_data()).into_owned()
}

/// Split a raw response into its status line and body.
pub fn status_and_body(response: &str) -> (&str, &str) {
    let status_line = response.lines().next().unwrap_or_default();
    let body = response.split_once("\r\n\r\n").map_or("", |(_, body)| body);
    (status_line, body)
}

/// A loopback HTTP server that records each request head and answers every
/// connection with the same canned response.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<String>,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn start(response: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, requests) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, requests, handle }
    }

    /// `127.0.0.1:<port>` of the listener.
    pub fn authority(&self) -> String {
        self.addr.to_string()
    }

    /// The next recorded request head.
    pub async fn next_request(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.requests.recv())
            .await
            .expect("upstream saw no request")
            .expect("upstream task ended")
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An address nothing is listening on.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
