#![allow(dead_code)]

mod builders;
mod dns_server_mock;
mod mock_transport;

pub use builders::{reply_to, ReplyBuilder};
pub use dns_server_mock::MockDnsServer;
pub use mock_transport::MockTransport;
