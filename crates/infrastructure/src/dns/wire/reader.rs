use stubdns_domain::DomainError;

/// Bounds-checked big-endian cursor over a received datagram.
///
/// The whole message stays reachable through [`WireReader::buffer`] so that
/// compressed names can jump backwards into earlier sections.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn ensure(&self, len: usize, what: &str) -> Result<(), DomainError> {
        if self.remaining() < len {
            return Err(DomainError::malformed(format!(
                "need {} bytes for {} at offset {}, {} remaining",
                len,
                what,
                self.pos,
                self.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8, DomainError> {
        self.ensure(1, what)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self, what: &str) -> Result<u16, DomainError> {
        self.ensure(2, what)?;
        let value = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self, what: &str) -> Result<u32, DomainError> {
        self.ensure(4, what)?;
        let value = u32::from_be_bytes([
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], DomainError> {
        self.ensure(len, what)?;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize, what: &str) -> Result<(), DomainError> {
        self.ensure(len, what)?;
        self.pos += len;
        Ok(())
    }

    /// Moves the cursor to an absolute offset inside the buffer.
    pub fn seek(&mut self, pos: usize) -> Result<(), DomainError> {
        if pos > self.buf.len() {
            return Err(DomainError::malformed(format!(
                "offset {} beyond message of {} bytes",
                pos,
                self.buf.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }
}
