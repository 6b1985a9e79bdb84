use super::driver::Event;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use stubdns_application::ports::Resolution;
use stubdns_domain::DomainError;
use tokio::sync::{mpsc, oneshot};

/// Future returned by [`DnsResolver::resolve`](super::DnsResolver::resolve).
///
/// Dropping it before it completes cancels the request: its timer is
/// stopped and its transaction id released.
pub struct Lookup {
    state: LookupState,
}

enum LookupState {
    Ready(Option<Result<Resolution, DomainError>>),
    Pending {
        ticket: u64,
        reply: oneshot::Receiver<Result<Resolution, DomainError>>,
        events: mpsc::UnboundedSender<Event>,
        done: bool,
    },
}

impl Lookup {
    pub(crate) fn ready(result: Result<Resolution, DomainError>) -> Self {
        Self {
            state: LookupState::Ready(Some(result)),
        }
    }

    pub(crate) fn pending(
        ticket: u64,
        reply: oneshot::Receiver<Result<Resolution, DomainError>>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            state: LookupState::Pending {
                ticket,
                reply,
                events,
                done: false,
            },
        }
    }
}

impl Future for Lookup {
    type Output = Result<Resolution, DomainError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            LookupState::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(DomainError::Cancelled)))
            }
            LookupState::Pending { reply, done, .. } => {
                let outcome = ready!(Pin::new(reply).poll(cx));
                *done = true;
                Poll::Ready(outcome.unwrap_or(Err(DomainError::Cancelled)))
            }
        }
    }
}

impl Drop for Lookup {
    fn drop(&mut self) {
        if let LookupState::Pending {
            ticket,
            events,
            done: false,
            ..
        } = &self.state
        {
            let _ = events.send(Event::Cancel { ticket: *ticket });
        }
    }
}
