use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Explicit server list. Empty means "discover from resolv.conf".
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default = "default_resolv_conf")]
    pub resolv_conf: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Wait before a query is retransmitted, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Transmissions sent to one server before moving to the next.
    #[serde(default = "default_attempts_per_server")]
    pub attempts_per_server: u8,
}

impl ResolverConfig {
    pub fn server_addrs(&self) -> Result<Vec<SocketAddr>, String> {
        self.servers
            .iter()
            .map(|s| parse_server_addr(s, self.port))
            .collect()
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            resolv_conf: default_resolv_conf(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            attempts_per_server: default_attempts_per_server(),
        }
    }
}

/// Parses `IP`, `IP:port` or `[IPv6]:port`. Bare addresses get `default_port`.
pub fn parse_server_addr(input: &str, default_port: u16) -> Result<SocketAddr, String> {
    let trimmed = input.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let bare = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    bare.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, default_port))
        .map_err(|_| format!("Invalid DNS server address: '{}'", input))
}

fn default_resolv_conf() -> String {
    "/etc/resolv.conf".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_attempts_per_server() -> u8 {
    2
}
