/// Outcome of one sweep over the resolution cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheSweepOutcome {
    pub entries_removed: usize,
    pub cache_size: usize,
}

/// Port for periodic cache maintenance.
pub trait CacheMaintenancePort: Send + Sync {
    /// Drop every expired address and alias entry.
    fn sweep_expired(&self) -> CacheSweepOutcome;
}
