use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[derive(Default)]
pub struct ResolverStats {
    pub queries_sent: AtomicU64,
    pub retries: AtomicU64,
    pub failovers: AtomicU64,
    pub timeouts: AtomicU64,
    pub successes: AtomicU64,
    pub failures: AtomicU64,
    pub cache_hits: AtomicU64,
    /// Datagrams that could not be tied to an outstanding request.
    pub unmatched_replies: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStatsSnapshot {
    pub queries_sent: u64,
    pub retries: u64,
    pub failovers: u64,
    pub timeouts: u64,
    pub successes: u64,
    pub failures: u64,
    pub cache_hits: u64,
    pub unmatched_replies: u64,
}

impl ResolverStats {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        ResolverStatsSnapshot {
            queries_sent: self.queries_sent.load(AtomicOrdering::Relaxed),
            retries: self.retries.load(AtomicOrdering::Relaxed),
            failovers: self.failovers.load(AtomicOrdering::Relaxed),
            timeouts: self.timeouts.load(AtomicOrdering::Relaxed),
            successes: self.successes.load(AtomicOrdering::Relaxed),
            failures: self.failures.load(AtomicOrdering::Relaxed),
            cache_hits: self.cache_hits.load(AtomicOrdering::Relaxed),
            unmatched_replies: self.unmatched_replies.load(AtomicOrdering::Relaxed),
        }
    }
}
