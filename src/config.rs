//! Server configuration from environment variables

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Configuration for the stats server
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind_addr: IpAddr,

    /// TCP port to listen on
    pub port: u16,

    /// Raw RUST_LOG value, if set
    pub rust_log: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TXSTATS_BIND_ADDR` (default: 0.0.0.0)
    /// - `TXSTATS_PORT` (default: 8080)
    /// - `RUST_LOG` (optional)
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("TXSTATS_BIND_ADDR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),

            port: env::var("TXSTATS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),

            rust_log: env::var("RUST_LOG").ok(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
