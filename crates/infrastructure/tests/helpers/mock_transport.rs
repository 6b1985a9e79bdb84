use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use stubdns_application::ports::DatagramTransport;
use stubdns_domain::DomainError;
use stubdns_infrastructure::dns::wire::Message;
use tokio::sync::mpsc;

type Responder = Box<dyn Fn(&Message, SocketAddr) -> Vec<(Vec<u8>, SocketAddr)> + Send + Sync>;
type Inbound = Result<(Vec<u8>, SocketAddr), DomainError>;

/// In-memory datagram transport.
///
/// Every sent query is recorded and handed to the responder, whose datagrams
/// are delivered back through `recv_from`.
pub struct MockTransport {
    sent: Mutex<Vec<(Message, SocketAddr)>>,
    responder: Responder,
    fail_sends: bool,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
}

impl MockTransport {
    fn with_responder(responder: Responder, fail_sends: bool) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            sent: Mutex::new(Vec::new()),
            responder,
            fail_sends,
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
        }
    }

    /// Never answers.
    pub fn silent() -> Self {
        Self::with_responder(Box::new(|_, _| Vec::new()), false)
    }

    /// Answers from the queried server with whatever `reply` returns.
    pub fn answering<F>(reply: F) -> Self
    where
        F: Fn(&Message, SocketAddr) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        Self::with_responder(
            Box::new(move |query, server| {
                reply(query, server)
                    .map(|bytes| vec![(bytes, server)])
                    .unwrap_or_default()
            }),
            false,
        )
    }

    /// Full control over what arrives and from where.
    pub fn scripted<F>(script: F) -> Self
    where
        F: Fn(&Message, SocketAddr) -> Vec<(Vec<u8>, SocketAddr)> + Send + Sync + 'static,
    {
        Self::with_responder(Box::new(script), false)
    }

    pub fn failing() -> Self {
        Self::with_responder(Box::new(|_, _| Vec::new()), true)
    }

    pub fn inject(&self, payload: Vec<u8>, from: SocketAddr) {
        let _ = self.inbound_tx.send(Ok((payload, from)));
    }

    /// The next pending `recv_from` returns `TransportFailure(reason)`.
    pub fn inject_receive_error(&self, reason: &str) {
        let _ = self
            .inbound_tx
            .send(Err(DomainError::TransportFailure(reason.to_string())));
    }

    pub fn sent(&self) -> Vec<(Message, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self, server: SocketAddr) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, target)| *target == server)
            .count()
    }
}

#[async_trait]
impl DatagramTransport for MockTransport {
    async fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<(), DomainError> {
        if self.fail_sends {
            return Err(DomainError::TransportFailure(format!(
                "network unreachable: {}",
                target
            )));
        }

        let query = Message::decode_any(payload).unwrap();
        let replies = (self.responder)(&query, target);
        self.sent.lock().unwrap().push((query, target));
        for datagram in replies {
            let _ = self.inbound_tx.send(Ok(datagram));
        }
        Ok(())
    }

    async fn recv_from(&self) -> Result<(Vec<u8>, SocketAddr), DomainError> {
        let mut inbound = self.inbound_rx.lock().await;
        inbound
            .recv()
            .await
            .unwrap_or_else(|| Err(DomainError::TransportFailure("mock transport closed".into())))
    }
}
