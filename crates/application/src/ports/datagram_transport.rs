use async_trait::async_trait;
use std::net::SocketAddr;
use stubdns_domain::DomainError;

/// Unreliable datagram channel the resolver speaks DNS over.
///
/// `send_to` and `recv_from` may be awaited concurrently from different tasks.
/// Failures surface as `DomainError::TransportFailure`.
#[async_trait]
pub trait DatagramTransport: Send + Sync {
    async fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<(), DomainError>;

    /// Waits for the next datagram from any peer.
    async fn recv_from(&self) -> Result<(Vec<u8>, SocketAddr), DomainError>;
}
