use crate::config::ConfigError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// Upstream nameserver endpoint.
///
/// Accepts a bare IP (`8.8.8.8`, `::1`) which gets port 53, or an explicit
/// `host:port` / `[v6]:port`. Hostnames are kept as-is and resolved by the
/// transport on every exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nameserver {
    host: String,
    port: u16,
}

impl Nameserver {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        let invalid = || ConfigError::InvalidNameserver(trimmed.to_string());

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Self::new(ip.to_string(), DEFAULT_DNS_PORT));
        }

        let (host, port) = split_host_port(trimmed).ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(invalid)?;

        Ok(Self::new(host, port))
    }

    /// Parse an ordered list; an empty list is rejected.
    pub fn parse_all<S: AsRef<str>>(addrs: &[S]) -> Result<Vec<Self>, ConfigError> {
        if addrs.is_empty() {
            return Err(ConfigError::NoNameservers);
        }
        addrs.iter().map(|a| Self::parse(a.as_ref())).collect()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Socket address when the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.host
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }
}

fn split_host_port(s: &str) -> Option<(&str, &str)> {
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((host, port));
    }

    let (host, port) = s.rsplit_once(':')?;
    // A second colon without brackets is an unbracketed IPv6 with a port.
    if host.contains(':') {
        return None;
    }
    Some((host, port))
}

impl FromStr for Nameserver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
