//! Configuration module for localdns
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `server`: Listener port and binding
//! - `local`: Top-level domains answered with loopback addresses
//! - `proxy`: Upstream nameservers, timeouts and cache sizing
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod local;
pub mod logging;
pub mod proxy;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use local::LocalConfig;
pub use logging::LoggingConfig;
pub use proxy::{ProxyConfig, ProxySettings, DEFAULT_STAGGER};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
