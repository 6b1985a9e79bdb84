use super::name::{encoded_name_len, read_name, write_name};
use super::reader::WireReader;
use bytes::{BufMut, BytesMut};
use stubdns_domain::{DomainError, RecordClass, RecordType};

/// A question-section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl Query {
    pub fn new(name: impl Into<String>, qtype: RecordType) -> Self {
        Self {
            name: name.into(),
            qtype,
            qclass: RecordClass::IN,
        }
    }

    pub fn with_class(mut self, qclass: RecordClass) -> Self {
        self.qclass = qclass;
        self
    }

    pub fn wire_len(&self) -> usize {
        encoded_name_len(&self.name) + 4
    }

    pub fn emit(&self, out: &mut BytesMut) -> Result<(), DomainError> {
        write_name(out, &self.name)?;
        out.put_u16(self.qtype.to_u16());
        out.put_u16(self.qclass.to_u16());
        Ok(())
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, DomainError> {
        let name = read_name(reader)?;
        let qtype = RecordType::from_u16(reader.read_u16("question type")?);
        let qclass = RecordClass::from_u16(reader.read_u16("question class")?);
        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }
}
