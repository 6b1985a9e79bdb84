use std::net::IpAddr;
use stubdns_domain::ResponseCode;
use stubdns_infrastructure::dns::wire::{Message, RecordData, ResourceRecord};

/// Builds the reply a server would send to `query`.
pub struct ReplyBuilder {
    message: Message,
}

pub fn reply_to(query: &Message) -> ReplyBuilder {
    let mut message = Message::new(query.id);
    message.is_response = true;
    message.recursion_desired = query.recursion_desired;
    message.recursion_available = true;
    message.queries = query.queries.clone();
    ReplyBuilder { message }
}

impl ReplyBuilder {
    pub fn address(mut self, name: &str, addr: &str, ttl: u32) -> Self {
        let addr: IpAddr = addr.parse().unwrap();
        self.message
            .answers
            .push(ResourceRecord::new(name, ttl, RecordData::from(addr)));
        self
    }

    pub fn alias(mut self, name: &str, target: &str, ttl: u32) -> Self {
        self.message.answers.push(ResourceRecord::new(
            name,
            ttl,
            RecordData::Cname(target.to_string()),
        ));
        self
    }

    pub fn additional_address(mut self, name: &str, addr: &str, ttl: u32) -> Self {
        let addr: IpAddr = addr.parse().unwrap();
        self.message
            .additional
            .push(ResourceRecord::new(name, ttl, RecordData::from(addr)));
        self
    }

    pub fn rcode(mut self, code: ResponseCode) -> Self {
        self.message.response_code = code;
        self
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.message.id = id;
        self
    }

    pub fn message(self) -> Message {
        self.message
    }

    pub fn bytes(self) -> Vec<u8> {
        self.message.encode().unwrap().to_vec()
    }
}
