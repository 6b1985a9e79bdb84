use std::net::SocketAddr;

/// Source of candidate DNS servers, consulted once per resolution to seed the rotation.
pub trait ServerListProvider: Send + Sync {
    fn candidate_servers(&self) -> Vec<SocketAddr>;
}
