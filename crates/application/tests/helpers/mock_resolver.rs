use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use stubdns_application::ports::{HostResolver, Resolution};
use stubdns_domain::{AddressFamily, DomainError};

type Key = (String, AddressFamily);

#[derive(Clone, Default)]
pub struct MockHostResolver {
    answers: Arc<RwLock<HashMap<Key, Result<Resolution, DomainError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockHostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_addresses(&self, name: &str, family: AddressFamily, addrs: &[&str]) {
        let addresses: Vec<IpAddr> = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.answers.write().unwrap().insert(
            (name.to_string(), family),
            Ok(Resolution::new(name, addresses, false)),
        );
    }

    pub fn set_cached(&self, name: &str, family: AddressFamily, addrs: &[&str]) {
        let addresses: Vec<IpAddr> = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.answers.write().unwrap().insert(
            (name.to_string(), family),
            Ok(Resolution::new(name, addresses, true)),
        );
    }

    pub fn set_error(&self, name: &str, family: AddressFamily, error: DomainError) {
        self.answers
            .write()
            .unwrap()
            .insert((name.to_string(), family), Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResolver for MockHostResolver {
    async fn resolve(&self, name: &str, family: AddressFamily) -> Result<Resolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .read()
            .unwrap()
            .get(&(name.to_string(), family))
            .cloned()
            .unwrap_or_else(|| Err(DomainError::UnknownHost(name.to_string())))
    }
}
