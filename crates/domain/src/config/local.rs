use crate::question::fqdn;
use serde::{Deserialize, Serialize};

/// Top-level domains answered authoritatively with loopback addresses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalConfig {
    /// e.g. `["dev", "test"]`; every name under these resolves to localhost
    #[serde(default = "default_tlds")]
    pub tlds: Vec<String>,

    /// TTL of the synthesized answers, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl LocalConfig {
    /// Configured TLDs in canonical form, blanks dropped.
    pub fn normalized_tlds(&self) -> Vec<String> {
        self.tlds
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(fqdn)
            .collect()
    }
}

fn default_tlds() -> Vec<String> {
    vec!["dev".to_string()]
}

fn default_ttl() -> u32 {
    600
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            tlds: default_tlds(),
            ttl: default_ttl(),
        }
    }
}
