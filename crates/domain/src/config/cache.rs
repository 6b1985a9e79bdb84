use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Seconds between background sweeps of expired entries; 0 disables the sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on CNAME indirections followed during a lookup.
    #[serde(default = "default_max_alias_depth")]
    pub max_alias_depth: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            max_alias_depth: default_max_alias_depth(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_alias_depth() -> usize {
    8
}
