//! # localdns
//!
//! Local development DNS: loopback answers for development TLDs and a
//! caching forwarder for everything else.

mod bootstrap;
mod di;
mod server;

use bootstrap::{init_logging, load_config};
use clap::Parser;
use di::DnsServices;
use localdns_application::use_cases::AdminDispatcher;
use localdns_domain::CliOverrides;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "localdns")]
#[command(version)]
#[command(about = "DNS server for local development with a caching upstream proxy")]
struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Top-level domains answered with loopback addresses [default: dev]
    #[arg(long = "tld", value_delimiter = ',')]
    tlds: Option<Vec<String>>,

    /// TTL of loopback answers in seconds [default: 600]
    #[arg(long)]
    ttl: Option<u32>,

    /// Listening port [default: 5353]
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream nameservers; enables proxy mode (e.g. 8.8.8.8,1.1.1.1:53)
    #[arg(long = "proxy", value_delimiter = ',')]
    nameservers: Option<Vec<String>>,

    /// Per-attempt upstream timeout in milliseconds [default: 2000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Positive cache expiration in seconds [default: 600]
    #[arg(long)]
    expire_secs: Option<u64>,

    /// Negative cache expiration in seconds [default: half of --expire-secs]
    #[arg(long)]
    negative_expire_secs: Option<u64>,

    /// Entries per cache store [default: 65536]
    #[arg(long = "cache")]
    cache_size: Option<usize>,

    /// Delay between upstream launches in milliseconds [default: 1]
    #[arg(long)]
    stagger_ms: Option<u64>,

    /// Log at debug level
    #[arg(short = 'd', long)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            port: self.port,
            tlds: self.tlds.clone(),
            ttl: self.ttl,
            nameservers: self.nameservers.clone(),
            timeout_ms: self.timeout_ms,
            expire_secs: self.expire_secs,
            negative_expire_secs: self.negative_expire_secs,
            cache_size: self.cache_size,
            stagger_ms: self.stagger_ms,
            log_level: self.debug.then(|| "debug".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let config = match load_config(config_path, cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level);
    bootstrap::config::log_config(config_path, &config);

    let services = DnsServices::build(&config)?;

    if let Some(proxy) = &services.proxy {
        let (tx, rx) = mpsc::channel(16);
        let dispatcher = Arc::new(AdminDispatcher::new(proxy.clone()));
        let _admin_task = dispatcher.start(rx);
        server::spawn_admin_signals(tx);
    }

    let listen_addr = config.server.listen_addr()?;

    tokio::select! {
        result = server::start_dns_server(listen_addr, services.handler) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
