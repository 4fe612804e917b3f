use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Address both the UDP socket and the TCP listener bind to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .bind_address
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::invalid("server.bind_address", e.to_string()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5353
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}
