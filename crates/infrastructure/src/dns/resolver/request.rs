use bytes::Bytes;
use smallvec::SmallVec;
use std::net::SocketAddr;
use stubdns_application::ports::{Resolution, TimerHandle};
use stubdns_domain::{AddressFamily, DomainError};
use tokio::sync::oneshot;

pub(crate) type ReplySender = oneshot::Sender<Result<Resolution, DomainError>>;

/// What to do after a reply timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryStep {
    Resend(SocketAddr),
    Failover(SocketAddr),
    Exhausted,
}

/// Per-request rotation over the candidate servers.
///
/// Each server gets `attempts_per_server` transmissions; once they are used
/// up the next server starts with a fresh count.
#[derive(Debug, Clone)]
pub(crate) struct RetryBudget {
    servers: Vec<SocketAddr>,
    index: usize,
    sends_to_current: u8,
    attempts_per_server: u8,
}

impl RetryBudget {
    /// `None` when there is no server to try.
    pub(crate) fn new(servers: Vec<SocketAddr>, attempts_per_server: u8) -> Option<Self> {
        if servers.is_empty() {
            return None;
        }
        Some(Self {
            servers,
            index: 0,
            sends_to_current: 0,
            attempts_per_server: attempts_per_server.max(1),
        })
    }

    pub(crate) fn current_server(&self) -> SocketAddr {
        self.servers[self.index]
    }

    pub(crate) fn record_send(&mut self) {
        self.sends_to_current = self.sends_to_current.saturating_add(1);
    }

    pub(crate) fn on_timeout(&mut self) -> RetryStep {
        if self.sends_to_current < self.attempts_per_server {
            return RetryStep::Resend(self.current_server());
        }
        if self.index + 1 < self.servers.len() {
            self.index += 1;
            self.sends_to_current = 0;
            return RetryStep::Failover(self.current_server());
        }
        RetryStep::Exhausted
    }

    pub(crate) fn knows(&self, addr: &SocketAddr) -> bool {
        self.servers.contains(addr)
    }
}

/// State of one in-flight transaction, owned by the driver.
pub(crate) struct PendingRequest {
    pub(crate) ticket: u64,
    pub(crate) name: String,
    pub(crate) families: SmallVec<[AddressFamily; 2]>,
    pub(crate) payload: Bytes,
    pub(crate) budget: RetryBudget,
    /// Bumped on every transmission so stale timer events can be told apart.
    pub(crate) generation: u32,
    pub(crate) timer: Option<Box<dyn TimerHandle>>,
    pub(crate) reply: ReplySender,
}

impl PendingRequest {
    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Delivers the outcome; a caller that stopped waiting is ignored.
    pub(crate) fn complete(mut self, result: Result<Resolution, DomainError>) {
        self.cancel_timer();
        let _ = self.reply.send(result);
    }
}
