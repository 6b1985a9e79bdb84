//! Stub resolver: cache fast path in front of a single-task state machine
//! that owns every in-flight transaction.

mod builder;
mod config;
mod driver;
mod lookup;
mod request;
mod stats;

pub use builder::ResolverBuilder;
pub use config::{
    ResolverOptions, DEFAULT_ATTEMPTS_PER_SERVER, DEFAULT_TIMEOUT,
    MAX_CONSECUTIVE_RECEIVE_FAILURES,
};
pub use lookup::Lookup;
pub use stats::{ResolverStats, ResolverStatsSnapshot};

use super::cache::ResolverCache;
use async_trait::async_trait;
use driver::{address_families, Driver, Event, Submission};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use stubdns_application::ports::{
    DatagramTransport, HostResolver, Resolution, Scheduler, ServerListProvider,
};
use stubdns_domain::{AddressFamily, DomainError, RecordType};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Handle to a running resolver.
///
/// Cloning is not supported; share it behind an `Arc`. The driver task stops
/// once the handle and every outstanding [`Lookup`] are dropped, or on
/// [`DnsResolver::shutdown`].
pub struct DnsResolver {
    events: mpsc::UnboundedSender<Event>,
    cache: Arc<ResolverCache>,
    stats: Arc<ResolverStats>,
    next_ticket: AtomicU64,
}

impl DnsResolver {
    pub fn builder(
        transport: Arc<dyn DatagramTransport>,
        servers: Arc<dyn ServerListProvider>,
    ) -> ResolverBuilder {
        ResolverBuilder::new(transport, servers)
    }

    pub(crate) fn spawn(
        transport: Arc<dyn DatagramTransport>,
        servers: Arc<dyn ServerListProvider>,
        scheduler: Arc<dyn Scheduler>,
        cache: Arc<ResolverCache>,
        options: ResolverOptions,
    ) -> Self {
        let (events, events_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(ResolverStats::default());

        let driver = Driver::new(
            transport,
            servers,
            scheduler,
            Arc::clone(&cache),
            Arc::clone(&stats),
            options,
            events_rx,
            events.downgrade(),
        );
        tokio::spawn(driver.run());

        Self {
            events,
            cache,
            stats,
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Resolves `name` to addresses of one family.
    pub fn resolve(&self, name: &str, family: AddressFamily) -> Lookup {
        self.resolve_types(name, &[family.record_type()])
    }

    /// Sends one message carrying a question per entry of `types`.
    ///
    /// Every record in the reply is cached; the result lists the cached
    /// addresses of `name` for the address types among `types`, following
    /// aliases. A live cached answer for every requested address type
    /// completes immediately without network traffic.
    pub fn resolve_types(&self, name: &str, types: &[RecordType]) -> Lookup {
        let name = name.trim();
        let name = name.strip_suffix('.').unwrap_or(name);
        if name.is_empty() {
            return Lookup::ready(Err(DomainError::InvalidDomainName(
                "empty host name".to_string(),
            )));
        }
        if types.is_empty() {
            return Lookup::ready(Err(DomainError::InvalidDomainName(format!(
                "no record types requested for {}",
                name
            ))));
        }

        if let Some(addresses) = self.cached(name, types) {
            ResolverStats::bump(&self.stats.cache_hits);
            debug!(name = %name, addresses = addresses.len(), "Answered from cache");
            return Lookup::ready(Ok(Resolution::new(name, addresses, true)));
        }

        let ticket = self.next_ticket.fetch_add(1, AtomicOrdering::Relaxed);
        let (reply, reply_rx) = oneshot::channel();
        let submission = Submission {
            ticket,
            name: name.to_string(),
            types: types.to_vec(),
            reply,
        };
        if self.events.send(Event::Submit(submission)).is_err() {
            return Lookup::ready(Err(DomainError::Cancelled));
        }
        Lookup::pending(ticket, reply_rx, self.events.clone())
    }

    fn cached(&self, name: &str, types: &[RecordType]) -> Option<Vec<IpAddr>> {
        if !types.iter().all(RecordType::is_address) {
            return None;
        }
        let mut addresses = Vec::new();
        for family in address_families(types) {
            addresses.extend(self.cache.get(name, family)?);
        }
        Some(addresses)
    }

    /// Blocks the calling thread until [`resolve`](Self::resolve) completes.
    ///
    /// The driver must be running on another thread, so this must not be
    /// called from inside an async task.
    pub fn resolve_blocking(
        &self,
        name: &str,
        family: AddressFamily,
    ) -> Result<Resolution, DomainError> {
        futures::executor::block_on(self.resolve(name, family))
    }

    pub fn cache(&self) -> &Arc<ResolverCache> {
        &self.cache
    }

    pub fn stats(&self) -> ResolverStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stops the driver. Outstanding lookups fail with `Cancelled`.
    pub fn shutdown(&self) {
        let _ = self.events.send(Event::Shutdown);
    }
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, name: &str, family: AddressFamily) -> Result<Resolution, DomainError> {
        DnsResolver::resolve(self, name, family).await
    }
}
