use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stubdns_application::ports::{CacheMaintenancePort, CacheSweepOutcome};

pub struct MockCacheMaintenancePort {
    sweeps: AtomicUsize,
    outcome: Mutex<CacheSweepOutcome>,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            sweeps: AtomicUsize::new(0),
            outcome: Mutex::new(CacheSweepOutcome::default()),
        }
    }

    pub fn with_outcome(self, outcome: CacheSweepOutcome) -> Self {
        *self.outcome.lock().unwrap() = outcome;
        self
    }

    pub fn sweep_count(&self) -> usize {
        self.sweeps.load(Ordering::SeqCst)
    }
}

impl CacheMaintenancePort for MockCacheMaintenancePort {
    fn sweep_expired(&self) -> CacheSweepOutcome {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }
}
