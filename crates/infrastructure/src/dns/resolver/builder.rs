use super::config::ResolverOptions;
use super::DnsResolver;
use crate::dns::cache::ResolverCache;
use crate::dns::scheduler::TokioScheduler;
use std::sync::Arc;
use std::time::Duration;
use stubdns_application::ports::{DatagramTransport, Scheduler, ServerListProvider};
use tracing::info;

pub struct ResolverBuilder {
    transport: Arc<dyn DatagramTransport>,
    servers: Arc<dyn ServerListProvider>,
    scheduler: Arc<dyn Scheduler>,
    cache: Option<Arc<ResolverCache>>,
    options: ResolverOptions,
}

impl ResolverBuilder {
    pub fn new(transport: Arc<dyn DatagramTransport>, servers: Arc<dyn ServerListProvider>) -> Self {
        Self {
            transport,
            servers,
            scheduler: Arc::new(TokioScheduler::new()),
            cache: None,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Shares `cache` with the resolver instead of giving it a private one.
    pub fn with_cache(mut self, cache: Arc<ResolverCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn with_attempts_per_server(mut self, attempts: u8) -> Self {
        self.options.attempts_per_server = attempts;
        self
    }

    /// Starts the resolver's driver task. Must be called within a tokio runtime.
    pub fn build(self) -> DnsResolver {
        info!(
            timeout_ms = self.options.timeout.as_millis() as u64,
            attempts_per_server = self.options.attempts_per_server,
            shared_cache = self.cache.is_some(),
            "Building DNS resolver"
        );

        let cache = self.cache.unwrap_or_default();
        DnsResolver::spawn(
            self.transport,
            self.servers,
            self.scheduler,
            cache,
            self.options,
        )
    }
}
