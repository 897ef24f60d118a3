use crate::config::RESOLVE_DNS_TIMEOUT_MS;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::{sync::Arc, time::Duration};
use tracing::{debug, trace, warn};

pub type DnsResolver = Arc<dyn Resolve>;

#[async_trait]
pub trait Resolve: Send + Sync {
    /// First address returned for `host`, or `None` on error or empty answer.
    async fn resolve(&self, host: &str) -> Option<IpAddr>;
}

pub struct HickoryResolver {
    inner: TokioAsyncResolver,
}

impl HickoryResolver {
    pub fn new() -> Self {
        let (config, opts) = resolver_setup();
        debug!("DNS resolver options: {:?}", opts);
        let inner = TokioAsyncResolver::tokio(config, opts);

        debug!("DNS resolver created: {:?}", inner);
        Self { inner }
    }
}

#[async_trait]
impl Resolve for HickoryResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        match self.inner.lookup_ip(host).await {
            Ok(lookup_ip) => {
                trace!("{:?}", lookup_ip);
                lookup_ip.iter().next()
            }
            Err(err) => {
                trace!("{}: {}", host, err);
                None
            }
        }
    }
}

// host resolv.conf first, the public defaults only when it cannot be read
fn resolver_setup() -> (ResolverConfig, ResolverOpts) {
    let (config, mut opts) = match read_system_conf() {
        Ok(system) => system,
        Err(err) => {
            warn!("System DNS configuration unavailable, using defaults: {}", err);
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = Duration::from_millis(RESOLVE_DNS_TIMEOUT_MS);
    (config, opts)
}

pub fn new_resolver() -> DnsResolver {
    Arc::new(HickoryResolver::new())
}
