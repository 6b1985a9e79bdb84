//! The resolver's event loop.
//!
//! Every send, reply, timer expiry and cancellation is an [`Event`] handled
//! one at a time by a single task, so request state is never shared.

use super::config::{ResolverOptions, MAX_CONSECUTIVE_RECEIVE_FAILURES};
use super::request::{PendingRequest, ReplySender, RetryBudget, RetryStep};
use super::stats::ResolverStats;
use crate::dns::cache::ResolverCache;
use crate::dns::wire::{normalize_name, Message, RecordData};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use stubdns_application::ports::{DatagramTransport, Resolution, Scheduler, ServerListProvider};
use stubdns_domain::{AddressFamily, DomainError, RecordType, ResponseCode};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

pub(crate) enum Event {
    Submit(Submission),
    Datagram { payload: Vec<u8>, from: SocketAddr },
    ReceiveFailed(DomainError),
    ReceiverStopped(DomainError),
    Timeout { id: u16, generation: u32 },
    Cancel { ticket: u64 },
    Shutdown,
}

pub(crate) struct Submission {
    pub(crate) ticket: u64,
    pub(crate) name: String,
    pub(crate) types: Vec<RecordType>,
    pub(crate) reply: ReplySender,
}

/// Address families asked for by `types`, in order, without repeats.
pub(crate) fn address_families(types: &[RecordType]) -> SmallVec<[AddressFamily; 2]> {
    let mut families = SmallVec::new();
    for family in types.iter().filter_map(|t| AddressFamily::from_record_type(*t)) {
        if !families.contains(&family) {
            families.push(family);
        }
    }
    families
}

fn receive_backoff(failures: u32) -> Duration {
    Duration::from_millis(10u64 << failures.saturating_sub(1).min(7))
}

/// Addresses of `name` carried in the reply's answer section, following
/// aliases inside the reply. Used when the cache has nothing live, e.g. for
/// records with a zero ttl.
fn reply_addresses(message: &Message, name: &str, family: AddressFamily) -> Vec<IpAddr> {
    let mut owner = normalize_name(name);

    for _ in 0..=message.answers.len() {
        let addresses: Vec<IpAddr> = message
            .answers
            .iter()
            .filter(|r| normalize_name(&r.name) == owner)
            .filter_map(|r| r.data.as_ip())
            .filter(|ip| AddressFamily::of(ip) == family)
            .collect();
        if !addresses.is_empty() {
            return addresses;
        }

        let next = message.answers.iter().find_map(|r| match &r.data {
            RecordData::Cname(target) if normalize_name(&r.name) == owner => {
                Some(normalize_name(target))
            }
            _ => None,
        });
        match next {
            Some(target) => owner = target,
            None => break,
        }
    }

    Vec::new()
}

pub(crate) struct Driver {
    transport: Arc<dyn DatagramTransport>,
    servers: Arc<dyn ServerListProvider>,
    scheduler: Arc<dyn Scheduler>,
    cache: Arc<ResolverCache>,
    stats: Arc<ResolverStats>,
    options: ResolverOptions,
    events: mpsc::UnboundedReceiver<Event>,
    events_tx: mpsc::WeakUnboundedSender<Event>,
    pending: FxHashMap<u16, PendingRequest>,
    tickets: FxHashMap<u64, u16>,
    receive_error: Option<DomainError>,
}

impl Driver {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        transport: Arc<dyn DatagramTransport>,
        servers: Arc<dyn ServerListProvider>,
        scheduler: Arc<dyn Scheduler>,
        cache: Arc<ResolverCache>,
        stats: Arc<ResolverStats>,
        options: ResolverOptions,
        events: mpsc::UnboundedReceiver<Event>,
        events_tx: mpsc::WeakUnboundedSender<Event>,
    ) -> Self {
        Self {
            transport,
            servers,
            scheduler,
            cache,
            stats,
            options,
            events,
            events_tx,
            pending: FxHashMap::default(),
            tickets: FxHashMap::default(),
            receive_error: None,
        }
    }

    /// Runs until shutdown is requested or every handle is gone.
    pub(crate) async fn run(mut self) {
        let receiver = self.spawn_receiver();

        while let Some(event) = self.events.recv().await {
            match event {
                Event::Submit(submission) => self.on_submit(submission).await,
                Event::Datagram { payload, from } => self.on_datagram(&payload, from),
                Event::ReceiveFailed(error) => self.on_receive_failed(error),
                Event::ReceiverStopped(error) => self.on_receiver_stopped(error),
                Event::Timeout { id, generation } => self.on_timeout(id, generation).await,
                Event::Cancel { ticket } => self.on_cancel(ticket),
                Event::Shutdown => break,
            }
        }

        receiver.abort();
        self.fail_all(DomainError::Cancelled);
        debug!("Resolver driver stopped");
    }

    /// Feeds datagrams from the transport into the event queue.
    ///
    /// Holds only a weak sender while waiting so an idle receiver never keeps
    /// the driver alive. A receive error is reported and receiving resumes
    /// after a short backoff; a long run of errors stops the receiver.
    fn spawn_receiver(&self) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let mut failures: u32 = 0;
            loop {
                let received = transport.recv_from().await;
                let Some(tx) = events.upgrade() else {
                    break;
                };
                match received {
                    Ok((payload, from)) => {
                        failures = 0;
                        if tx.send(Event::Datagram { payload, from }).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        failures += 1;
                        if failures >= MAX_CONSECUTIVE_RECEIVE_FAILURES {
                            let _ = tx.send(Event::ReceiverStopped(error));
                            break;
                        }
                        if tx.send(Event::ReceiveFailed(error)).is_err() {
                            break;
                        }
                        drop(tx);
                        tokio::time::sleep(receive_backoff(failures)).await;
                    }
                }
            }
        })
    }

    fn fresh_id(&self) -> Option<u16> {
        if self.pending.len() > usize::from(u16::MAX) {
            return None;
        }
        loop {
            let id = fastrand::u16(..);
            if !self.pending.contains_key(&id) {
                return Some(id);
            }
        }
    }

    fn reject(&self, reply: ReplySender, error: DomainError) {
        ResolverStats::bump(&self.stats.failures);
        let _ = reply.send(Err(error));
    }

    async fn on_submit(&mut self, submission: Submission) {
        let Submission {
            ticket,
            name,
            types,
            reply,
        } = submission;

        if let Some(error) = &self.receive_error {
            let error = error.clone();
            self.reject(reply, error);
            return;
        }

        let Some(budget) =
            RetryBudget::new(self.servers.candidate_servers(), self.options.attempts_per_server)
        else {
            warn!(name = %name, "No candidate DNS servers");
            self.reject(reply, DomainError::NoServers);
            return;
        };

        let Some(id) = self.fresh_id() else {
            self.reject(
                reply,
                DomainError::TransportFailure("every transaction id is in use".to_string()),
            );
            return;
        };

        let payload = match Message::query(id, &name, &types).encode() {
            Ok(payload) => payload,
            Err(error) => {
                self.reject(reply, error);
                return;
            }
        };

        debug!(id = id, name = %name, types = ?types, "Submitting query");

        self.pending.insert(
            id,
            PendingRequest {
                ticket,
                families: address_families(&types),
                name,
                payload,
                budget,
                generation: 0,
                timer: None,
                reply,
            },
        );
        self.tickets.insert(ticket, id);
        self.transmit(id).await;
    }

    /// Sends the request's query to its current server and arms its timer.
    async fn transmit(&mut self, id: u16) {
        let Some(request) = self.pending.get_mut(&id) else {
            return;
        };
        let server = request.budget.current_server();
        let payload = request.payload.clone();
        request.budget.record_send();
        request.generation = request.generation.wrapping_add(1);
        let generation = request.generation;

        let transport = Arc::clone(&self.transport);
        if let Err(error) = transport.send_to(&payload, server).await {
            warn!(id = id, server = %server, error = %error, "Query transmission failed");
            self.finish(id, Err(error));
            return;
        }
        ResolverStats::bump(&self.stats.queries_sent);
        trace!(id = id, server = %server, generation = generation, "Query sent");

        let events = self.events_tx.clone();
        let timer = self.scheduler.after(
            self.options.timeout,
            Box::new(move || {
                if let Some(tx) = events.upgrade() {
                    let _ = tx.send(Event::Timeout { id, generation });
                }
            }),
        );

        match self.pending.get_mut(&id) {
            Some(request) => request.timer = Some(timer),
            None => timer.cancel(),
        }
    }

    async fn on_timeout(&mut self, id: u16, generation: u32) {
        let Some(request) = self.pending.get_mut(&id) else {
            trace!(id = id, "Timer fired for a finished request");
            return;
        };
        if request.generation != generation {
            trace!(id = id, generation = generation, "Stale timer ignored");
            return;
        }
        request.timer = None;
        ResolverStats::bump(&self.stats.timeouts);

        match request.budget.on_timeout() {
            RetryStep::Resend(server) => {
                ResolverStats::bump(&self.stats.retries);
                debug!(id = id, server = %server, "No reply, resending");
                self.transmit(id).await;
            }
            RetryStep::Failover(server) => {
                ResolverStats::bump(&self.stats.failovers);
                warn!(id = id, server = %server, "No reply, failing over to next server");
                self.transmit(id).await;
            }
            RetryStep::Exhausted => {
                let name = request.name.clone();
                warn!(id = id, name = %name, "No server answered");
                self.finish(id, Err(DomainError::Timeout { name }));
            }
        }
    }

    fn on_datagram(&mut self, payload: &[u8], from: SocketAddr) {
        let Some(id) = Message::peek_id(payload) else {
            ResolverStats::bump(&self.stats.unmatched_replies);
            warn!(from = %from, len = payload.len(), "Datagram shorter than a DNS header");
            return;
        };

        let Some(request) = self.pending.get(&id) else {
            ResolverStats::bump(&self.stats.unmatched_replies);
            warn!(id = id, from = %from, "Reply matches no outstanding request");
            return;
        };

        if !request.budget.knows(&from) {
            ResolverStats::bump(&self.stats.unmatched_replies);
            warn!(id = id, from = %from, "Reply from a server that was never queried");
            return;
        }

        let name = request.name.clone();
        let families = request.families.clone();

        let message = match Message::decode(payload, id) {
            Ok(message) => message,
            Err(error) => {
                warn!(id = id, from = %from, error = %error, "Malformed reply");
                self.finish(id, Err(error));
                return;
            }
        };

        if !message.is_response {
            ResolverStats::bump(&self.stats.unmatched_replies);
            warn!(id = id, from = %from, "Datagram with matching id is not a response");
            return;
        }

        let result = self.outcome(&name, &families, &message, from);
        self.finish(id, result);
    }

    fn outcome(
        &self,
        name: &str,
        families: &[AddressFamily],
        message: &Message,
        from: SocketAddr,
    ) -> Result<Resolution, DomainError> {
        match message.response_code {
            ResponseCode::NXDomain => return Err(DomainError::UnknownHost(name.to_string())),
            code if !code.is_success() => {
                return Err(DomainError::ServerError {
                    code: code.to_u8(),
                    description: code.description(),
                })
            }
            _ => {}
        }

        if message.truncated {
            debug!(name = %name, server = %from, "Reply truncated, using the records it carries");
        }

        let cached = message.records().filter(|r| self.cache.put(r)).count();
        let addresses: Vec<_> = families
            .iter()
            .flat_map(|family| {
                self.cache
                    .get(name, *family)
                    .unwrap_or_else(|| reply_addresses(message, name, *family))
            })
            .collect();

        debug!(
            name = %name,
            server = %from,
            cached = cached,
            addresses = addresses.len(),
            "Reply processed"
        );

        Ok(Resolution::new(name, addresses, false).with_server(from))
    }

    fn finish(&mut self, id: u16, result: Result<Resolution, DomainError>) {
        let Some(request) = self.pending.remove(&id) else {
            return;
        };
        self.tickets.remove(&request.ticket);

        let counter = if result.is_ok() {
            &self.stats.successes
        } else {
            &self.stats.failures
        };
        ResolverStats::bump(counter);
        request.complete(result);
    }

    fn on_cancel(&mut self, ticket: u64) {
        let Some(id) = self.tickets.remove(&ticket) else {
            return;
        };
        if let Some(mut request) = self.pending.remove(&id) {
            request.cancel_timer();
            debug!(id = id, name = %request.name, "Request cancelled by caller");
        }
    }

    /// Outstanding requests fail; later requests are served normally.
    fn on_receive_failed(&mut self, error: DomainError) {
        warn!(error = %error, pending = self.pending.len(), "Transport receive failed");
        self.fail_all(error);
    }

    fn on_receiver_stopped(&mut self, error: DomainError) {
        warn!(
            error = %error,
            failures = MAX_CONSECUTIVE_RECEIVE_FAILURES,
            "Transport keeps failing, no longer accepting requests"
        );
        self.receive_error = Some(error.clone());
        self.fail_all(error);
    }

    fn fail_all(&mut self, error: DomainError) {
        self.tickets.clear();
        for (_, request) in self.pending.drain() {
            ResolverStats::bump(&self.stats.failures);
            request.complete(Err(error.clone()));
        }
    }
}
