use std::net::SocketAddr;
use stubdns_infrastructure::dns::wire::{Message, RecordData, ResourceRecord};
use stubdns_domain::RecordType;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Loopback UDP server answering every A question with 93.184.216.34 and
/// every AAAA question with 2001:db8::34, ttl 60.
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start() -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            if let Some(response) = Self::build_mock_response(&buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_mock_response(query: &[u8]) -> Option<Vec<u8>> {
        let query = Message::decode_any(query).ok()?;

        let mut response = Message::new(query.id);
        response.is_response = true;
        response.recursion_desired = query.recursion_desired;
        response.recursion_available = true;
        response.queries = query.queries.clone();

        for question in &query.queries {
            let data = match question.qtype {
                RecordType::A => RecordData::A([93, 184, 216, 34].into()),
                RecordType::AAAA => RecordData::Aaaa("2001:db8::34".parse().ok()?),
                _ => continue,
            };
            response
                .answers
                .push(ResourceRecord::new(question.name.clone(), 60, data));
        }

        response.encode().ok().map(|bytes| bytes.to_vec())
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
