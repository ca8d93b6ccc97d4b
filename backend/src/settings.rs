//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RIDESHARE_*` environment variables or a
//! configuration file. Without a database URL the server keeps its data in
//! memory.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Raised when the configured host is not an IP address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("host must be an IP address, got {host:?}")]
pub struct InvalidHost {
    pub host: String,
}

/// Configuration values for the HTTP server and its store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RIDESHARE")]
pub struct AppSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<String>,
    /// Port to bind; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL connection string. Absent means the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections; defaults to 10.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving; defaults to true.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, InvalidHost> {
        let ip = match self.host.as_deref() {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(raw) => raw.parse().map_err(|_| InvalidHost {
                host: raw.to_owned(),
            })?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Configured pool size, falling back to the default.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Whether to apply pending migrations at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}
