use super::ConfigError;
use crate::nameserver::Nameserver;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Pause between launching two upstream attempts of the same race.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(1);

/// `[proxy]` section. Proxy mode is on when at least one nameserver is listed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Upstream servers in preference order, e.g. `["8.8.8.8", "1.1.1.1:53"]`
    #[serde(default)]
    pub nameservers: Vec<String>,

    /// Per-attempt timeout covering connect, write and read
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Positive cache expiration
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,

    /// Negative cache expiration; half of `expire_secs` when unset
    #[serde(default)]
    pub negative_expire_secs: Option<u64>,

    /// Capacity of each cache store
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,

    /// Forward unsupported queries (other classes/types) without caching
    /// instead of answering SERVFAIL
    #[serde(default)]
    pub passthrough_unsupported: bool,

    /// Answer negative cache hits with the upstream's original response code
    /// instead of SERVFAIL
    #[serde(default)]
    pub echo_negative_rcode: bool,
}

impl ProxyConfig {
    pub fn is_enabled(&self) -> bool {
        !self.nameservers.is_empty()
    }

    /// Validated runtime settings for the proxy.
    pub fn settings(&self) -> Result<ProxySettings, ConfigError> {
        let mut settings = ProxySettings::new(
            &self.nameservers,
            Duration::from_millis(self.timeout_ms),
            Duration::from_secs(self.expire_secs),
            self.cache_size,
        )?
        .with_stagger(Duration::from_millis(self.stagger_ms))
        .with_passthrough_unsupported(self.passthrough_unsupported)
        .with_echo_negative_rcode(self.echo_negative_rcode);

        if let Some(secs) = self.negative_expire_secs {
            settings = settings.with_negative_expire(Duration::from_secs(secs));
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_expire_secs() -> u64 {
    600
}

fn default_cache_size() -> usize {
    65_536
}

fn default_stagger_ms() -> u64 {
    1
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            nameservers: vec![],
            timeout_ms: default_timeout_ms(),
            expire_secs: default_expire_secs(),
            negative_expire_secs: None,
            cache_size: default_cache_size(),
            stagger_ms: default_stagger_ms(),
            passthrough_unsupported: false,
            echo_negative_rcode: false,
        }
    }
}

/// Immutable proxy parameters, fixed at startup.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub nameservers: Vec<Nameserver>,
    pub timeout: Duration,
    pub expire: Duration,
    pub negative_expire: Duration,
    pub cache_size: NonZeroUsize,
    pub stagger: Duration,
    pub passthrough_unsupported: bool,
    pub echo_negative_rcode: bool,
}

impl ProxySettings {
    /// Settings with the negative expiration at half the positive one.
    pub fn new<S: AsRef<str>>(
        addrs: &[S],
        timeout: Duration,
        expire: Duration,
        cache_size: usize,
    ) -> Result<Self, ConfigError> {
        let nameservers = Nameserver::parse_all(addrs)?;
        let cache_size = NonZeroUsize::new(cache_size)
            .ok_or_else(|| ConfigError::invalid("proxy.cache_size", "must be greater than 0"))?;

        let settings = Self {
            nameservers,
            timeout,
            expire,
            negative_expire: expire / 2,
            cache_size,
            stagger: DEFAULT_STAGGER,
            passthrough_unsupported: false,
            echo_negative_rcode: false,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_negative_expire(mut self, negative_expire: Duration) -> Self {
        self.negative_expire = negative_expire;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_passthrough_unsupported(mut self, enabled: bool) -> Self {
        self.passthrough_unsupported = enabled;
        self
    }

    pub fn with_echo_negative_rcode(mut self, enabled: bool) -> Self {
        self.echo_negative_rcode = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nameservers.is_empty() {
            return Err(ConfigError::NoNameservers);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::invalid("proxy.timeout", "must be greater than 0"));
        }
        if self.expire.is_zero() {
            return Err(ConfigError::invalid("proxy.expire", "must be greater than 0"));
        }
        if self.negative_expire.is_zero() {
            return Err(ConfigError::invalid(
                "proxy.negative_expire",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}
