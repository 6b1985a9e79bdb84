use super::question::Query;
use super::reader::WireReader;
use super::record::ResourceRecord;
use bytes::{BufMut, Bytes, BytesMut};
use stubdns_domain::{DomainError, RecordType, ResponseCode};

pub const HEADER_LEN: usize = 12;

const QR_BIT: u16 = 1 << 15;
const AA_BIT: u16 = 1 << 10;
const TC_BIT: u16 = 1 << 9;
const RD_BIT: u16 = 1 << 8;
const RA_BIT: u16 = 1 << 7;
const OPCODE_SHIFT: u16 = 11;

/// A complete DNS message: header plus the four sections.
///
/// Section counts are not stored; they are derived from the section lengths
/// when encoding and dictate how many entries are read when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: u16,
    pub is_response: bool,
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub response_code: ResponseCode,
    pub queries: Vec<Query>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// A recursion-desired standard query with one question per record type.
    pub fn query(id: u16, name: &str, types: &[RecordType]) -> Self {
        Self {
            id,
            recursion_desired: true,
            queries: types.iter().map(|t| Query::new(name, *t)).collect(),
            ..Default::default()
        }
    }

    pub fn flags(&self) -> u16 {
        let mut flags = u16::from(self.opcode & 0x0F) << OPCODE_SHIFT;
        if self.is_response {
            flags |= QR_BIT;
        }
        if self.authoritative {
            flags |= AA_BIT;
        }
        if self.truncated {
            flags |= TC_BIT;
        }
        if self.recursion_desired {
            flags |= RD_BIT;
        }
        if self.recursion_available {
            flags |= RA_BIT;
        }
        flags | u16::from(self.response_code.to_u8() & 0x0F)
    }

    pub fn set_flags(&mut self, flags: u16) {
        self.is_response = flags & QR_BIT != 0;
        self.opcode = ((flags >> OPCODE_SHIFT) & 0x0F) as u8;
        self.authoritative = flags & AA_BIT != 0;
        self.truncated = flags & TC_BIT != 0;
        self.recursion_desired = flags & RD_BIT != 0;
        self.recursion_available = flags & RA_BIT != 0;
        self.response_code = ResponseCode::from_u8((flags & 0x0F) as u8);
    }

    pub fn wire_len(&self) -> usize {
        HEADER_LEN
            + self.queries.iter().map(Query::wire_len).sum::<usize>()
            + self.records().map(ResourceRecord::wire_len).sum::<usize>()
    }

    /// All answer, authority and additional records, in that order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }

    pub fn encode_into(&self, out: &mut BytesMut) -> Result<(), DomainError> {
        let count = |len: usize, section: &str| {
            u16::try_from(len).map_err(|_| {
                DomainError::malformed(format!("{} section holds {} entries", section, len))
            })
        };
        let qdcount = count(self.queries.len(), "question")?;
        let ancount = count(self.answers.len(), "answer")?;
        let nscount = count(self.authority.len(), "authority")?;
        let arcount = count(self.additional.len(), "additional")?;

        out.reserve(self.wire_len());
        out.put_u16(self.id);
        out.put_u16(self.flags());
        out.put_u16(qdcount);
        out.put_u16(ancount);
        out.put_u16(nscount);
        out.put_u16(arcount);

        for query in &self.queries {
            query.emit(out)?;
        }
        for record in self.records() {
            record.emit(out)?;
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Bytes, DomainError> {
        let mut out = BytesMut::with_capacity(self.wire_len());
        self.encode_into(&mut out)?;
        Ok(out.freeze())
    }

    /// Transaction id of a datagram, if it is long enough to carry a header.
    pub fn peek_id(buf: &[u8]) -> Option<u16> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(u16::from_be_bytes([buf[0], buf[1]]))
    }

    /// Decodes `buf`, failing unless its id equals `expected_id`.
    pub fn decode(buf: &[u8], expected_id: u16) -> Result<Self, DomainError> {
        let mut reader = WireReader::new(buf);
        let id = reader.read_u16("header id")?;
        if id != expected_id {
            return Err(DomainError::TransactionMismatch {
                expected: expected_id,
                actual: id,
            });
        }
        Self::decode_body(id, &mut reader)
    }

    /// Decodes `buf` whatever its id.
    pub fn decode_any(buf: &[u8]) -> Result<Self, DomainError> {
        let mut reader = WireReader::new(buf);
        let id = reader.read_u16("header id")?;
        Self::decode_body(id, &mut reader)
    }

    fn decode_body(id: u16, reader: &mut WireReader<'_>) -> Result<Self, DomainError> {
        let flags = reader.read_u16("header flags")?;
        let qdcount = reader.read_u16("question count")?;
        let ancount = reader.read_u16("answer count")?;
        let nscount = reader.read_u16("authority count")?;
        let arcount = reader.read_u16("additional count")?;

        let mut message = Message::new(id);
        message.set_flags(flags);

        message.queries = (0..qdcount)
            .map(|_| Query::decode(reader))
            .collect::<Result<_, _>>()?;
        message.answers = Self::decode_section(reader, ancount)?;
        message.authority = Self::decode_section(reader, nscount)?;
        message.additional = Self::decode_section(reader, arcount)?;

        Ok(message)
    }

    fn decode_section(
        reader: &mut WireReader<'_>,
        count: u16,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let mut records = Vec::with_capacity(usize::from(count).min(32));
        for _ in 0..count {
            if let Some(record) = ResourceRecord::decode_in_section(reader)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bit_positions() {
        let mut message = Message::new(1);
        message.is_response = true;
        assert_eq!(message.flags(), 0x8000);

        let mut message = Message::new(1);
        message.opcode = 2;
        message.authoritative = true;
        message.truncated = true;
        assert_eq!(message.flags(), 0x1000 | 0x0400 | 0x0200);

        let mut message = Message::new(1);
        message.recursion_desired = true;
        message.recursion_available = true;
        message.response_code = ResponseCode::NXDomain;
        assert_eq!(message.flags(), 0x0183);
    }

    #[test]
    fn test_set_flags_ignores_reserved_bits() {
        let mut message = Message::new(0);
        message.set_flags(0x8180 | 0x0070);
        assert!(message.is_response);
        assert!(message.recursion_desired);
        assert!(message.recursion_available);
        assert_eq!(message.response_code, ResponseCode::NoError);
        assert_eq!(message.flags(), 0x8180);
    }

    #[test]
    fn test_peek_id_needs_full_header() {
        assert_eq!(Message::peek_id(&[0xab, 0xcd]), None);
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = 0xab;
        buf[1] = 0xcd;
        assert_eq!(Message::peek_id(&buf), Some(0xabcd));
    }

    #[test]
    fn test_query_constructor_sets_recursion_desired() {
        let message = Message::query(7, "example.com", &[RecordType::A, RecordType::AAAA]);
        assert!(message.recursion_desired);
        assert!(!message.is_response);
        assert_eq!(message.queries.len(), 2);
        assert_eq!(message.queries[1].qtype, RecordType::AAAA);
    }
}
