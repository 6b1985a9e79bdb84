use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use stubdns_application::ports::ServerListProvider;
use tracing::{debug, warn};

pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// Public resolvers used when the host lists none.
pub const FALLBACK_SERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(84, 200, 69, 80)),
    IpAddr::V6(Ipv6Addr::new(0x2001, 0x1608, 0x10, 0x25, 0, 0, 0x9249, 0xd69b)),
];

/// Reads `nameserver` lines from a resolv.conf file on every call.
pub struct ResolvConfProvider {
    path: String,
    port: u16,
}

impl ResolvConfProvider {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_RESOLV_CONF)
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            port: 53,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Nameservers listed in `content`, in file order.
    pub fn parse(content: &str, port: u16) -> Vec<SocketAddr> {
        let mut servers = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let mut fields = line.split_whitespace();
            if fields.next() != Some("nameserver") {
                continue;
            }
            let Some(value) = fields.next() else {
                continue;
            };

            match value.parse::<IpAddr>() {
                Ok(ip) => servers.push(SocketAddr::new(ip, port)),
                Err(e) => {
                    debug!(error = %e, value = value, "Skipping unusable nameserver entry");
                }
            }
        }

        servers
    }

    fn fallback(&self) -> Vec<SocketAddr> {
        FALLBACK_SERVERS
            .iter()
            .map(|ip| SocketAddr::new(*ip, self.port))
            .collect()
    }
}

impl Default for ResolvConfProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerListProvider for ResolvConfProvider {
    fn candidate_servers(&self) -> Vec<SocketAddr> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path, error = %e, "Cannot read resolver configuration, using fallback servers");
                return self.fallback();
            }
        };

        let servers = Self::parse(&content, self.port);
        if servers.is_empty() {
            warn!(path = %self.path, "No nameserver entries found, using fallback servers");
            return self.fallback();
        }

        debug!(path = %self.path, servers = servers.len(), "Loaded nameservers");
        servers
    }
}
