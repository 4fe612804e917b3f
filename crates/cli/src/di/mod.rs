use anyhow::Context;
use localdns_domain::Config;
use localdns_infrastructure::dns::{DnsProxy, DnsServerHandler, LocalResponder};
use std::sync::Arc;
use tracing::info;

/// Long-lived DNS components built from the validated configuration.
pub struct DnsServices {
    pub handler: DnsServerHandler,
    pub proxy: Option<Arc<DnsProxy>>,
}

impl DnsServices {
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let local = LocalResponder::new(&config.local.tlds, config.local.ttl)?;
        info!(tlds = %local.tlds().join(","), ttl = config.local.ttl, "Loopback responder ready");

        let proxy = if config.proxy.is_enabled() {
            let settings = config.proxy.settings()?;
            let proxy = DnsProxy::from_settings(&settings).context("failed to build proxy")?;
            Some(Arc::new(proxy))
        } else {
            info!("Proxy mode disabled, only local TLDs will be answered");
            None
        };

        let handler = DnsServerHandler::new(local, proxy.clone());
        Ok(Self { handler, proxy })
    }
}
