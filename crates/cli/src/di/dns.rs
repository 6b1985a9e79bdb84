use std::sync::Arc;
use stubdns_application::ports::{CacheMaintenancePort, ServerListProvider};
use stubdns_application::use_cases::LookupHostUseCase;
use stubdns_domain::Config;
use stubdns_infrastructure::dns::{DnsResolver, ResolverCache, ResolverOptions, UdpTransport};
use stubdns_infrastructure::system::{ResolvConfProvider, StaticServerProvider};
use stubdns_jobs::CacheSweepJob;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct DnsServices {
    pub resolver: Arc<DnsResolver>,
    pub cache: Arc<ResolverCache>,
    pub lookup_host: LookupHostUseCase,
    shutdown: CancellationToken,
}

impl DnsServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let servers = Self::server_provider(config)?;
        let transport = Arc::new(UdpTransport::bind().await?);
        info!(local = ?transport.local_addrs(), "UDP transport bound");

        let cache = Arc::new(ResolverCache::new(config.cache.max_alias_depth));
        let resolver = Arc::new(
            DnsResolver::builder(transport, servers)
                .with_cache(cache.clone())
                .with_options(ResolverOptions::from(&config.resolver))
                .build(),
        );

        let shutdown = CancellationToken::new();
        if config.cache.sweep_interval_secs > 0 {
            let job = Arc::new(
                CacheSweepJob::new(cache.clone() as Arc<dyn CacheMaintenancePort>)
                    .with_interval(config.cache.sweep_interval_secs)
                    .with_cancellation(shutdown.clone()),
            );
            job.start();
        }

        let lookup_host = LookupHostUseCase::new(resolver.clone());

        Ok(Self {
            resolver,
            cache,
            lookup_host,
            shutdown,
        })
    }

    fn server_provider(config: &Config) -> anyhow::Result<Arc<dyn ServerListProvider>> {
        if config.resolver.servers.is_empty() {
            info!(path = %config.resolver.resolv_conf, "Discovering DNS servers from resolver configuration");
            return Ok(Arc::new(
                ResolvConfProvider::with_path(config.resolver.resolv_conf.clone())
                    .with_port(config.resolver.port),
            ));
        }

        let addrs = config.resolver.server_addrs().map_err(anyhow::Error::msg)?;
        info!(servers = ?addrs, "Using configured DNS servers");
        Ok(Arc::new(StaticServerProvider::new(addrs)))
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.resolver.shutdown();

        let stats = self.resolver.stats();
        let cache = self.cache.stats();
        info!(
            queries_sent = stats.queries_sent,
            retries = stats.retries,
            timeouts = stats.timeouts,
            cache_hits = stats.cache_hits,
            unmatched_replies = stats.unmatched_replies,
            cache_entries = self.cache.len(),
            cache_insertions = cache.insertions,
            "Resolver stopped"
        );
    }
}
