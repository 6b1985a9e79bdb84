use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use stubdns_domain::{AddressFamily, DomainError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: Arc<str>,
    pub addresses: Vec<IpAddr>,
    pub cache_hit: bool,
    /// Server that produced the answer; `None` for cache hits.
    pub server: Option<SocketAddr>,
}

impl Resolution {
    pub fn new(name: &str, addresses: Vec<IpAddr>, cache_hit: bool) -> Self {
        Self {
            name: Arc::from(name),
            addresses,
            cache_hit,
            server: None,
        }
    }

    pub fn with_server(mut self, server: SocketAddr) -> Self {
        self.server = Some(server);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, name: &str, family: AddressFamily) -> Result<Resolution, DomainError>;
}
