use super::reader::WireReader;
use bytes::{BufMut, BytesMut};
use stubdns_domain::DomainError;

pub const MAX_LABEL_LEN: usize = 63;
/// Upper bound on the encoded length of a name, terminator included.
pub const MAX_NAME_LEN: usize = 255;

/// A 255-byte name holds at most 127 labels, so no legitimate name needs more
/// jumps than this.
const MAX_POINTER_JUMPS: usize = 127;

const POINTER_MASK: u8 = 0xC0;

fn labels(name: &str) -> impl Iterator<Item = &str> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    trimmed.split('.').filter(move |_| !trimmed.is_empty())
}

/// Canonical key for a name: lower case, no trailing dot.
pub fn normalize_name(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

/// Encoded size of `name` without compression. Does not validate.
pub fn encoded_name_len(name: &str) -> usize {
    labels(name).map(|label| label.len() + 1).sum::<usize>() + 1
}

/// Appends `name` as length-prefixed labels followed by the zero terminator.
///
/// A single trailing dot is accepted; `""` and `"."` encode the root name.
pub fn write_name(out: &mut BytesMut, name: &str) -> Result<(), DomainError> {
    let total = encoded_name_len(name);
    if total > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "{} encodes to {} bytes (max {})",
            name, total, MAX_NAME_LEN
        )));
    }

    for label in labels(name) {
        if label.is_empty() {
            return Err(DomainError::InvalidDomainName(format!(
                "empty label in {}",
                name
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' is {} bytes (max {})",
                label,
                label.len(),
                MAX_LABEL_LEN
            )));
        }
    }

    out.reserve(total);
    for label in labels(name) {
        out.put_u8(label.len() as u8);
        out.put_slice(label.as_bytes());
    }
    out.put_u8(0);
    Ok(())
}

pub fn encode_name(name: &str) -> Result<Vec<u8>, DomainError> {
    let mut out = BytesMut::with_capacity(encoded_name_len(name));
    write_name(&mut out, name)?;
    Ok(out.to_vec())
}

/// Decodes the name starting at `offset`, following compression pointers
/// into the rest of `buf`.
///
/// Returns the dotted name (no trailing dot, `""` for the root) and the number
/// of bytes the name occupies at `offset`: up to and including either the
/// terminator or the first pointer.
pub fn decode_name(buf: &[u8], offset: usize) -> Result<(String, usize), DomainError> {
    let mut name = String::new();
    let mut pos = offset;
    let mut consumed: Option<usize> = None;
    let mut jumps = 0usize;
    let mut wire_len = 0usize;

    loop {
        let len = *buf.get(pos).ok_or_else(|| {
            DomainError::malformed(format!("name at offset {} runs past end of message", offset))
        })?;

        match len & POINTER_MASK {
            0x00 => {}
            POINTER_MASK => {
                let low = *buf.get(pos + 1).ok_or_else(|| {
                    DomainError::malformed(format!("truncated compression pointer at {}", pos))
                })?;
                if consumed.is_none() {
                    consumed = Some(pos + 2 - offset);
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(DomainError::malformed(format!(
                        "compression pointer loop in name at offset {}",
                        offset
                    )));
                }
                pos = (usize::from(len & !POINTER_MASK) << 8) | usize::from(low);
                continue;
            }
            other => {
                return Err(DomainError::malformed(format!(
                    "unsupported label type {:#04x} at offset {}",
                    other, pos
                )));
            }
        }

        wire_len += usize::from(len) + 1;
        if wire_len > MAX_NAME_LEN {
            return Err(DomainError::malformed(format!(
                "name at offset {} exceeds {} bytes",
                offset, MAX_NAME_LEN
            )));
        }

        if len == 0 {
            let consumed = consumed.unwrap_or(pos + 1 - offset);
            return Ok((name, consumed));
        }

        let start = pos + 1;
        let end = start + usize::from(len);
        let label = buf.get(start..end).ok_or_else(|| {
            DomainError::malformed(format!("label at offset {} runs past end of message", pos))
        })?;
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&String::from_utf8_lossy(label));
        pos = end;
    }
}

/// Reads a name at the reader's cursor and advances past it.
pub fn read_name(reader: &mut WireReader<'_>) -> Result<String, DomainError> {
    let (name, consumed) = decode_name(reader.buffer(), reader.position())?;
    reader.skip(consumed, "name")?;
    Ok(name)
}
