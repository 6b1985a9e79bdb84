pub mod cache;
pub mod resolver;
pub mod scheduler;
pub mod transport;
pub mod wire;

pub use cache::{CacheMetrics, CacheStats, ResolverCache};
pub use resolver::{
    DnsResolver, Lookup, ResolverBuilder, ResolverOptions, ResolverStats, ResolverStatsSnapshot,
};
pub use scheduler::TokioScheduler;
pub use transport::UdpTransport;
