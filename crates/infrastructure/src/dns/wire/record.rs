use super::name::{encoded_name_len, read_name, write_name};
use super::rdata::RecordData;
use super::reader::WireReader;
use bytes::{BufMut, BytesMut};
use stubdns_domain::{DomainError, RecordClass, RecordType};
use tracing::debug;

/// An answer, authority or additional entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rclass: RecordClass,
    pub ttl: u32,
    pub data: RecordData,
}

struct RecordFrame {
    name: String,
    rtype: RecordType,
    rclass: RecordClass,
    ttl: u32,
    rdlength: usize,
}

impl ResourceRecord {
    pub fn new(name: impl Into<String>, ttl: u32, data: RecordData) -> Self {
        Self {
            name: name.into(),
            rclass: RecordClass::IN,
            ttl,
            data,
        }
    }

    #[inline]
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    pub fn wire_len(&self) -> usize {
        encoded_name_len(&self.name) + 10 + self.data.wire_len()
    }

    pub fn emit(&self, out: &mut BytesMut) -> Result<(), DomainError> {
        let rdlength = u16::try_from(self.data.wire_len()).map_err(|_| {
            DomainError::malformed(format!("record data for {} exceeds 65535 bytes", self.name))
        })?;
        write_name(out, &self.name)?;
        out.put_u16(self.record_type().to_u16());
        out.put_u16(self.rclass.to_u16());
        out.put_u32(self.ttl);
        out.put_u16(rdlength);
        self.data.emit(out)
    }

    fn decode_frame(reader: &mut WireReader<'_>) -> Result<RecordFrame, DomainError> {
        let name = read_name(reader)?;
        let rtype = RecordType::from_u16(reader.read_u16("record type")?);
        let rclass = RecordClass::from_u16(reader.read_u16("record class")?);
        let ttl = reader.read_u32("record ttl")?;
        let rdlength = usize::from(reader.read_u16("record data length")?);
        if rdlength > reader.remaining() {
            return Err(DomainError::malformed(format!(
                "record {} declares {} data bytes but only {} remain",
                name,
                rdlength,
                reader.remaining()
            )));
        }
        Ok(RecordFrame {
            name,
            rtype,
            rclass,
            ttl,
            rdlength,
        })
    }

    /// Strict decode: any framing or payload problem fails the record.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, DomainError> {
        let frame = Self::decode_frame(reader)?;
        let data = RecordData::decode(frame.rtype, reader, frame.rdlength)?;
        Ok(Self {
            name: frame.name,
            rclass: frame.rclass,
            ttl: frame.ttl,
            data,
        })
    }

    /// Decode used for message sections.
    ///
    /// Framing errors still fail, since the rest of the message cannot be
    /// located without them. A payload that does not parse for its type is
    /// skipped and `None` is returned with the cursor past the record.
    pub(crate) fn decode_in_section(
        reader: &mut WireReader<'_>,
    ) -> Result<Option<Self>, DomainError> {
        let frame = Self::decode_frame(reader)?;
        let start = reader.position();
        match RecordData::decode(frame.rtype, reader, frame.rdlength) {
            Ok(data) => Ok(Some(Self {
                name: frame.name,
                rclass: frame.rclass,
                ttl: frame.ttl,
                data,
            })),
            Err(e) => {
                debug!(
                    name = %frame.name,
                    record_type = %frame.rtype,
                    error = %e,
                    "Skipping record with undecodable data"
                );
                reader.seek(start + frame.rdlength)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_record_layout() {
        let record = ResourceRecord::new(
            "a.b",
            300,
            RecordData::A(Ipv4Addr::new(192, 0, 2, 1)),
        );
        let mut out = BytesMut::new();
        record.emit(&mut out).unwrap();

        assert_eq!(out.len(), record.wire_len());
        assert_eq!(
            &out[..],
            &[
                1, b'a', 1, b'b', 0, // name
                0, 1, 0, 1, // type A, class IN
                0, 0, 1, 44, // ttl 300
                0, 4, 192, 0, 2, 1,
            ]
        );
    }

    #[test]
    fn test_strict_decode_rejects_short_ttl() {
        let buf = [0, 0, 1, 0, 1, 0, 0];
        let mut reader = WireReader::new(&buf);
        let err = ResourceRecord::decode(&mut reader).unwrap_err();
        assert!(err.to_string().contains("ttl"));
    }

    #[test]
    fn test_strict_decode_rejects_missing_type() {
        let buf = [0, 0];
        let mut reader = WireReader::new(&buf);
        assert!(ResourceRecord::decode(&mut reader).unwrap_err().is_malformed());
    }

    #[test]
    fn test_section_decode_skips_bad_payload() {
        // Root-named AAAA record with only 4 data bytes, then a trailing byte.
        let buf = [0, 0, 28, 0, 1, 0, 0, 0, 60, 0, 4, 1, 2, 3, 4, 0xee];
        let mut reader = WireReader::new(&buf);

        assert_eq!(ResourceRecord::decode_in_section(&mut reader).unwrap(), None);
        assert_eq!(reader.position(), 15);

        let mut strict = WireReader::new(&buf);
        assert!(ResourceRecord::decode(&mut strict).is_err());
    }
}
