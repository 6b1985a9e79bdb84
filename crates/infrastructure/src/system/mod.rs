pub mod resolv_conf;
pub mod static_servers;

pub use resolv_conf::{ResolvConfProvider, DEFAULT_RESOLV_CONF, FALLBACK_SERVERS};
pub use static_servers::StaticServerProvider;
