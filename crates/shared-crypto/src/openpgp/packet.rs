//! Packet framing (RFC 4880 §4.2). Reads both header formats, including
//! partial body lengths; always writes the new format with definite lengths.

use crate::CryptoError;

pub(crate) const TAG_PKESK: u8 = 1;
pub(crate) const TAG_SIGNATURE: u8 = 2;
pub(crate) const TAG_ONE_PASS_SIGNATURE: u8 = 4;
pub(crate) const TAG_COMPRESSED: u8 = 8;
pub(crate) const TAG_SYMMETRIC_LEGACY: u8 = 9;
pub(crate) const TAG_MARKER: u8 = 10;
pub(crate) const TAG_LITERAL: u8 = 11;
pub(crate) const TAG_SEIPD: u8 = 18;

pub(crate) fn malformed(what: impl Into<String>) -> CryptoError {
    CryptoError::MalformedMessage(what.into())
}

/// Forward-only cursor over packet bytes.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], CryptoError> {
        if self.data.len() < n {
            return Err(malformed(format!(
                "{what}: need {n} bytes, {} left",
                self.data.len()
            )));
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.data)
    }

    pub(crate) fn u8(&mut self, what: &str) -> Result<u8, CryptoError> {
        Ok(self.take(1, what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &str) -> Result<u16, CryptoError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self, what: &str) -> Result<u32, CryptoError> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Multiprecision integer: bit count, then the big-endian magnitude.
    pub(crate) fn mpi(&mut self, what: &str) -> Result<&'a [u8], CryptoError> {
        let bits = usize::from(self.u16(what)?);
        self.take(bits.div_ceil(8), what)
    }
}

/// One packet with its body reassembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Packet {
    pub tag: u8,
    pub body: Vec<u8>,
}

pub(crate) fn read_packet(r: &mut Reader<'_>) -> Result<Packet, CryptoError> {
    let header = r.u8("packet header")?;
    if header & 0x80 == 0 {
        return Err(malformed(format!("bad packet header {header:#04x}")));
    }

    if header & 0x40 == 0 {
        let tag = (header >> 2) & 0x0f;
        let body = match header & 0x03 {
            0 => {
                let n = usize::from(r.u8("length")?);
                r.take(n, "packet body")?
            }
            1 => {
                let n = usize::from(r.u16("length")?);
                r.take(n, "packet body")?
            }
            2 => {
                let n = r.u32("length")? as usize;
                r.take(n, "packet body")?
            }
            _ => r.rest(),
        };
        return Ok(Packet {
            tag,
            body: body.to_vec(),
        });
    }

    let tag = header & 0x3f;
    let mut body = Vec::new();
    loop {
        let first = r.u8("length")?;
        match first {
            0..=191 => {
                body.extend_from_slice(r.take(usize::from(first), "packet body")?);
                break;
            }
            192..=223 => {
                let second = usize::from(r.u8("length")?);
                let n = ((usize::from(first) - 192) << 8) + second + 192;
                body.extend_from_slice(r.take(n, "packet body")?);
                break;
            }
            255 => {
                let n = r.u32("length")? as usize;
                body.extend_from_slice(r.take(n, "packet body")?);
                break;
            }
            // Partial body: a power-of-two chunk, more length octets follow.
            _ => {
                let n = 1usize << (first & 0x1f);
                body.extend_from_slice(r.take(n, "partial body")?);
            }
        }
    }
    Ok(Packet { tag, body })
}

pub(crate) fn write_packet(out: &mut Vec<u8>, tag: u8, body: &[u8]) {
    out.push(0xC0 | tag);
    let len = body.len();
    if len < 192 {
        out.push(len as u8);
    } else if len < 8384 {
        let n = len - 192;
        out.push(((n >> 8) + 192) as u8);
        out.push((n & 0xff) as u8);
    } else {
        out.push(0xFF);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(body);
}

pub(crate) fn write_mpi(out: &mut Vec<u8>, value: &[u8]) {
    let start = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    let magnitude = &value[start..];
    let bits = magnitude
        .first()
        .map_or(0, |b| magnitude.len() * 8 - b.leading_zeros() as usize);
    out.extend_from_slice(&(bits as u16).to_be_bytes());
    out.extend_from_slice(magnitude);
}
