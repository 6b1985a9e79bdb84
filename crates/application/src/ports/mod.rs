mod cache_maintenance_port;
mod datagram_transport;
mod host_resolver;
mod scheduler;
mod server_list_provider;

pub use cache_maintenance_port::{CacheMaintenancePort, CacheSweepOutcome};
pub use datagram_transport::DatagramTransport;
pub use host_resolver::{HostResolver, Resolution};
pub use scheduler::{Scheduler, TimerCallback, TimerHandle};
pub use server_list_provider::ServerListProvider;
