use std::net::SocketAddr;
use stubdns_application::ports::ServerListProvider;

/// A fixed server list, typically from configuration or the command line.
#[derive(Debug, Clone)]
pub struct StaticServerProvider {
    servers: Vec<SocketAddr>,
}

impl StaticServerProvider {
    pub fn new(servers: Vec<SocketAddr>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}

impl ServerListProvider for StaticServerProvider {
    fn candidate_servers(&self) -> Vec<SocketAddr> {
        self.servers.clone()
    }
}
