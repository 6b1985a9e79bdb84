//! RFC 1035 wire format: names, record data, questions, resource records and
//! whole messages.
//!
//! Encoding never compresses names. Decoding follows compression pointers
//! anywhere in the message buffer.

mod message;
mod name;
mod question;
mod rdata;
mod reader;
mod record;

pub use message::{Message, HEADER_LEN};
pub use name::{
    decode_name, encode_name, encoded_name_len, normalize_name, write_name, MAX_LABEL_LEN,
    MAX_NAME_LEN,
};
pub use question::Query;
pub use rdata::RecordData;
pub use reader::WireReader;
pub use record::ResourceRecord;
