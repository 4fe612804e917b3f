use thiserror::Error;

/// Startup-time configuration failures. Any of these prevents the server from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid address: {0}")]
    InvalidNameserver(String),

    #[error("At least one nameserver is required in proxy mode")]
    NoNameservers,

    #[error("tld required")]
    NoTlds,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
