//! UDP transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). One socket per address family is
//! bound to an ephemeral port and shared by every outstanding query; replies
//! are correlated by transaction id, not by socket.

use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use stubdns_application::ports::DatagramTransport;
use stubdns_domain::DomainError;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Largest datagram accepted from a server.
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    v4: UdpSocket,
    v6: Option<UdpSocket>,
}

impl UdpTransport {
    /// Binds `0.0.0.0:0` and, when the host supports it, `[::]:0`.
    pub async fn bind() -> Result<Self, DomainError> {
        Self::bind_to(
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            Some(SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))),
        )
        .await
    }

    pub async fn bind_to(v4_addr: SocketAddr, v6_addr: Option<SocketAddr>) -> Result<Self, DomainError> {
        let v4 = UdpSocket::bind(v4_addr).await.map_err(|e| {
            DomainError::TransportFailure(format!("Failed to bind UDP socket {}: {}", v4_addr, e))
        })?;

        let v6 = match v6_addr {
            Some(addr) => match UdpSocket::bind(addr).await {
                Ok(socket) => Some(socket),
                Err(e) => {
                    warn!(addr = %addr, error = %e, "IPv6 UDP socket unavailable, IPv6 servers unreachable");
                    None
                }
            },
            None => None,
        };

        debug!(
            v4 = ?v4.local_addr().ok(),
            v6 = ?v6.as_ref().and_then(|s| s.local_addr().ok()),
            "UDP transport bound"
        );

        Ok(Self { v4, v6 })
    }

    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        std::iter::once(&self.v4)
            .chain(self.v6.as_ref())
            .filter_map(|socket| socket.local_addr().ok())
            .collect()
    }

    fn socket_for(&self, target: SocketAddr) -> Result<&UdpSocket, DomainError> {
        if target.is_ipv4() {
            return Ok(&self.v4);
        }
        self.v6.as_ref().ok_or_else(|| {
            DomainError::TransportFailure(format!("No IPv6 socket to reach {}", target))
        })
    }
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    async fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<(), DomainError> {
        let socket = self.socket_for(target)?;
        let bytes_sent = socket.send_to(payload, target).await.map_err(|e| {
            DomainError::TransportFailure(format!("Failed to send UDP query to {}: {}", target, e))
        })?;

        debug!(server = %target, bytes_sent = bytes_sent, "UDP query sent");
        Ok(())
    }

    async fn recv_from(&self) -> Result<(Vec<u8>, SocketAddr), DomainError> {
        let mut buf_v4 = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let mut buf_v6 = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let (result, from_v6) = match &self.v6 {
            None => (self.v4.recv_from(&mut buf_v4).await, false),
            Some(v6) => tokio::select! {
                r = self.v4.recv_from(&mut buf_v4) => (r, false),
                r = v6.recv_from(&mut buf_v6) => (r, true),
            },
        };

        let (bytes_received, from_addr) = result.map_err(|e| {
            DomainError::TransportFailure(format!("Failed to receive UDP response: {}", e))
        })?;

        let mut buf = if from_v6 { buf_v6 } else { buf_v4 };
        buf.truncate(bytes_received);

        debug!(server = %from_addr, bytes_received = bytes_received, "UDP response received");
        Ok((buf, from_addr))
    }
}
