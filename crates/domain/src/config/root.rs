use super::{ConfigError, LocalConfig, LoggingConfig, ProxyConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command line values; any `Some` wins over the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub tlds: Option<Vec<String>>,
    pub ttl: Option<u32>,
    pub nameservers: Option<Vec<String>>,
    pub timeout_ms: Option<u64>,
    pub expire_secs: Option<u64>,
    pub negative_expire_secs: Option<u64>,
    pub cache_size: Option<usize>,
    pub stagger_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    /// Reads the TOML file at `path` (defaults when `None`) and layers the
    /// overrides on top. Validation is a separate step.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(tlds) = overrides.tlds {
            self.local.tlds = tlds;
        }
        if let Some(ttl) = overrides.ttl {
            self.local.ttl = ttl;
        }
        if let Some(nameservers) = overrides.nameservers {
            self.proxy.nameservers = nameservers;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.proxy.timeout_ms = timeout_ms;
        }
        if let Some(expire_secs) = overrides.expire_secs {
            self.proxy.expire_secs = expire_secs;
        }
        if let Some(negative_expire_secs) = overrides.negative_expire_secs {
            self.proxy.negative_expire_secs = Some(negative_expire_secs);
        }
        if let Some(cache_size) = overrides.cache_size {
            self.proxy.cache_size = cache_size;
        }
        if let Some(stagger_ms) = overrides.stagger_ms {
            self.proxy.stagger_ms = stagger_ms;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local.normalized_tlds().is_empty() {
            return Err(ConfigError::NoTlds);
        }
        self.server.listen_addr()?;
        self.logging.validate()?;
        if self.proxy.is_enabled() {
            self.proxy.settings()?;
        }
        Ok(())
    }
}
