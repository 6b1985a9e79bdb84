use std::time::Duration;
use stubdns_domain::ResolverConfig;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_ATTEMPTS_PER_SERVER: u8 = 2;

/// Back-to-back receive errors after which the transport is treated as
/// closed and the resolver stops accepting requests.
pub const MAX_CONSECUTIVE_RECEIVE_FAILURES: u32 = 16;

/// Retry policy of a resolver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// How long to wait for a reply before the next transmission.
    pub timeout: Duration,
    /// Transmissions to one server before moving on to the next.
    pub attempts_per_server: u8,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            attempts_per_server: DEFAULT_ATTEMPTS_PER_SERVER,
        }
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            attempts_per_server: config.attempts_per_server.max(1),
        }
    }
}
