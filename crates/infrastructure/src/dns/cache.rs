//! Resolution cache: per-family address tables plus an alias table, every
//! entry carrying the absolute instant its ttl runs out.

mod metrics;

pub use metrics::{CacheMetrics, CacheStats};

use super::wire::{normalize_name, RecordData, ResourceRecord};
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Duration;
use stubdns_application::ports::{CacheMaintenancePort, CacheSweepOutcome};
use stubdns_domain::AddressFamily;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone)]
struct CachedAddress {
    addr: IpAddr,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct CachedAlias {
    target: String,
    expires_at: Instant,
}

type AddressSet = SmallVec<[CachedAddress; 4]>;
type AddressTable = DashMap<String, AddressSet, FxBuildHasher>;

#[inline]
fn is_live(expires_at: Instant, now: Instant) -> bool {
    now < expires_at
}

/// Thread-safe ttl cache shared by every request a resolver serves.
///
/// Keys are owner names in lower case without a trailing dot. An entry is
/// live while `now < expires_at`; expired entries are purged before a lookup
/// returns or counts anything.
pub struct ResolverCache {
    v4: AddressTable,
    v6: AddressTable,
    aliases: DashMap<String, CachedAlias, FxBuildHasher>,
    max_alias_depth: usize,
    metrics: Arc<CacheMetrics>,
}

impl Default for ResolverCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALIAS_DEPTH)
    }
}

impl ResolverCache {
    pub fn new(max_alias_depth: usize) -> Self {
        Self {
            v4: DashMap::with_hasher(FxBuildHasher),
            v6: DashMap::with_hasher(FxBuildHasher),
            aliases: DashMap::with_hasher(FxBuildHasher),
            max_alias_depth,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    fn table(&self, family: AddressFamily) -> &AddressTable {
        match family {
            AddressFamily::Ipv4 => &self.v4,
            AddressFamily::Ipv6 => &self.v6,
        }
    }

    /// Stores `record` under its owner name.
    ///
    /// A and AAAA records go to their family table and CNAME records to the
    /// alias table. Returns `false` for record types the cache does not keep.
    pub fn put(&self, record: &ResourceRecord) -> bool {
        match &record.data {
            RecordData::A(_) | RecordData::Aaaa(_) => {
                if let Some(addr) = record.data.as_ip() {
                    self.insert_address(&record.name, addr, record.ttl);
                }
                true
            }
            RecordData::Cname(target) => {
                self.insert_alias(&record.name, target, record.ttl);
                true
            }
            _ => false,
        }
    }

    pub fn insert_address(&self, name: &str, addr: IpAddr, ttl: u32) {
        let expires_at = Instant::now() + Duration::from_secs(u64::from(ttl));
        let mut entry = self
            .table(AddressFamily::of(&addr))
            .entry(normalize_name(name))
            .or_default();

        match entry.iter_mut().find(|cached| cached.addr == addr) {
            Some(existing) => existing.expires_at = expires_at,
            None => entry.push(CachedAddress { addr, expires_at }),
        }
        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn insert_alias(&self, name: &str, target: &str, ttl: u32) {
        let expires_at = Instant::now() + Duration::from_secs(u64::from(ttl));
        self.aliases.insert(
            normalize_name(name),
            CachedAlias {
                target: normalize_name(target),
                expires_at,
            },
        );
        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Live addresses of `name` for `family`, following aliases.
    ///
    /// `None` means nothing live is known, either directly or through the
    /// alias chain (which is also the answer for chains deeper than the
    /// configured limit, cycles included).
    pub fn get(&self, name: &str, family: AddressFamily) -> Option<Vec<IpAddr>> {
        let found = self.lookup(&normalize_name(name), family, 0);
        let counter = if found.is_some() {
            &self.metrics.hits
        } else {
            &self.metrics.misses
        };
        counter.fetch_add(1, AtomicOrdering::Relaxed);
        found
    }

    pub fn has(&self, name: &str, family: AddressFamily) -> bool {
        self.lookup(&normalize_name(name), family, 0).is_some()
    }

    /// Live alias target recorded for `name`, if any.
    pub fn alias_of(&self, name: &str) -> Option<String> {
        let key = normalize_name(name);
        self.live_alias(&key, Instant::now())
    }

    fn lookup(&self, key: &str, family: AddressFamily, depth: usize) -> Option<Vec<IpAddr>> {
        let now = Instant::now();

        if let Some(addresses) = self.live_addresses(key, family, now) {
            return Some(addresses);
        }

        let target = self.live_alias(key, now)?;
        if depth >= self.max_alias_depth {
            debug!(name = %key, depth, "Alias chain too deep, treating as absent");
            return None;
        }
        self.lookup(&target, family, depth + 1)
    }

    fn live_addresses(&self, key: &str, family: AddressFamily, now: Instant) -> Option<Vec<IpAddr>> {
        let table = self.table(family);
        let mut entry = table.get_mut(key)?;

        let before = entry.len();
        entry.retain(|cached| is_live(cached.expires_at, now));
        let purged = before - entry.len();
        if purged > 0 {
            self.metrics
                .expirations
                .fetch_add(purged as u64, AtomicOrdering::Relaxed);
        }

        if entry.is_empty() {
            drop(entry);
            table.remove_if(key, |_, set| set.is_empty());
            return None;
        }
        Some(entry.iter().map(|cached| cached.addr).collect())
    }

    fn live_alias(&self, key: &str, now: Instant) -> Option<String> {
        let alias = self.aliases.get(key)?;
        if is_live(alias.expires_at, now) {
            return Some(alias.target.clone());
        }
        drop(alias);
        if self
            .aliases
            .remove_if(key, |_, alias| !is_live(alias.expires_at, now))
            .is_some()
        {
            self.metrics.expirations.fetch_add(1, AtomicOrdering::Relaxed);
        }
        None
    }

    /// Drops every expired address and alias. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0usize;

        for table in [&self.v4, &self.v6] {
            table.retain(|_, set| {
                let before = set.len();
                set.retain(|cached| is_live(cached.expires_at, now));
                removed += before - set.len();
                !set.is_empty()
            });
        }

        self.aliases.retain(|_, alias| {
            let live = is_live(alias.expires_at, now);
            if !live {
                removed += 1;
            }
            live
        });

        if removed > 0 {
            self.metrics
                .expirations
                .fetch_add(removed as u64, AtomicOrdering::Relaxed);
        }
        removed
    }

    /// Number of stored addresses and aliases, expired ones included until
    /// they are purged.
    pub fn len(&self) -> usize {
        let addresses: usize = [&self.v4, &self.v6]
            .iter()
            .map(|table| table.iter().map(|set| set.len()).sum::<usize>())
            .sum();
        addresses + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty() && self.aliases.is_empty()
    }

    pub fn clear(&self) {
        self.v4.clear();
        self.v6.clear();
        self.aliases.clear();
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }
}

impl CacheMaintenancePort for ResolverCache {
    fn sweep_expired(&self) -> CacheSweepOutcome {
        let entries_removed = self.purge_expired();
        CacheSweepOutcome {
            entries_removed,
            cache_size: self.len(),
        }
    }
}
