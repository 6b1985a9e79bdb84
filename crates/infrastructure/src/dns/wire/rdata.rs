use super::name::{encoded_name_len, read_name, write_name};
use super::reader::WireReader;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use stubdns_domain::{DomainError, RecordType};

/// Typed payload of a resource record, selected by the record type code.
///
/// Types without a dedicated variant keep their raw bytes so that a message
/// carrying them still decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(String),
    Mx { preference: u16, exchange: String },
    Unknown { rtype: RecordType, data: Bytes },
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Mx { .. } => RecordType::MX,
            RecordData::Unknown { rtype, .. } => *rtype,
        }
    }

    /// Smallest rdata length a well-formed record of `rtype` can carry.
    pub fn min_len(rtype: RecordType) -> usize {
        match rtype.normalized() {
            RecordType::A => 4,
            RecordType::AAAA => 16,
            RecordType::CNAME => 1,
            RecordType::MX => 3,
            _ => 0,
        }
    }

    /// Decodes `rdlength` bytes at the reader's cursor.
    ///
    /// On success the cursor sits exactly `rdlength` bytes further on. Names
    /// inside the payload may point anywhere in the enclosing message.
    pub fn decode(
        rtype: RecordType,
        reader: &mut WireReader<'_>,
        rdlength: usize,
    ) -> Result<Self, DomainError> {
        reader.ensure(rdlength, "record data")?;
        if rdlength < Self::min_len(rtype) {
            return Err(DomainError::malformed(format!(
                "{} record data is {} bytes, need at least {}",
                rtype,
                rdlength,
                Self::min_len(rtype)
            )));
        }

        let start = reader.position();
        let end = start + rdlength;

        let data = match rtype.normalized() {
            RecordType::A => {
                let octets = reader.read_bytes(4, "A address")?;
                RecordData::A(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
            }
            RecordType::AAAA => {
                let bytes = reader.read_bytes(16, "AAAA address")?;
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                RecordData::Aaaa(Ipv6Addr::from(octets))
            }
            RecordType::CNAME => RecordData::Cname(read_name(reader)?),
            RecordType::MX => {
                let preference = reader.read_u16("MX preference")?;
                let exchange = read_name(reader)?;
                RecordData::Mx {
                    preference,
                    exchange,
                }
            }
            other => RecordData::Unknown {
                rtype: other,
                data: Bytes::copy_from_slice(reader.read_bytes(rdlength, "record data")?),
            },
        };

        if reader.position() > end {
            return Err(DomainError::malformed(format!(
                "{} record data overruns its declared length of {} bytes",
                rtype, rdlength
            )));
        }
        reader.seek(end)?;
        Ok(data)
    }

    /// Encoded size of the payload, excluding the 16-bit length prefix.
    pub fn wire_len(&self) -> usize {
        match self {
            RecordData::A(_) => 4,
            RecordData::Aaaa(_) => 16,
            RecordData::Cname(target) => encoded_name_len(target),
            RecordData::Mx { exchange, .. } => 2 + encoded_name_len(exchange),
            RecordData::Unknown { data, .. } => data.len(),
        }
    }

    pub fn emit(&self, out: &mut BytesMut) -> Result<(), DomainError> {
        match self {
            RecordData::A(addr) => out.put_slice(&addr.octets()),
            RecordData::Aaaa(addr) => out.put_slice(&addr.octets()),
            RecordData::Cname(target) => write_name(out, target)?,
            RecordData::Mx {
                preference,
                exchange,
            } => {
                out.put_u16(*preference);
                write_name(out, exchange)?;
            }
            RecordData::Unknown { data, .. } => out.put_slice(data),
        }
        Ok(())
    }

    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            RecordData::A(addr) => Some(IpAddr::V4(*addr)),
            RecordData::Aaaa(addr) => Some(IpAddr::V6(*addr)),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&str> {
        match self {
            RecordData::Cname(target) => Some(target),
            _ => None,
        }
    }
}

impl From<IpAddr> for RecordData {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => RecordData::A(v4),
            IpAddr::V6(v6) => RecordData::Aaaa(v6),
        }
    }
}
