//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Listener settings shared by every service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// Upper bound on the size of a request head.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    /// Listen on every interface of one address family.
    ///
    /// `[::]` when `ipv6` is set, `0.0.0.0` otherwise.
    pub fn listen_any(port: u16, ipv6: bool) -> Self {
        let ip = if ipv6 {
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        };

        Self {
            addr: SocketAddr::new(ip, port),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080),
            read_buffer_size: 8192,
        }
    }
}
