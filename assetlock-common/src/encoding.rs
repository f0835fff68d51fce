//! Little-endian byte writer/reader for the base-layer wire formats.

use crate::error::ProtocolError;

/// Append-only buffer for raw transaction layouts.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Compact-size integer: one byte below 0xfd, otherwise a marker and the
    /// smallest little-endian width that fits.
    pub fn varint(&mut self, v: u64) -> &mut Self {
        match v {
            0..=0xfc => self.u8(v as u8),
            0xfd..=0xffff => self.u8(0xfd).u16(v as u16),
            0x1_0000..=0xffff_ffff => self.u8(0xfe).u32(v as u32),
            _ => self.u8(0xff).u64(v),
        }
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed byte string.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.varint(bytes.len() as u64).raw(bytes)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed byte slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                ProtocolError::Decoding(format!(
                    "unexpected end of input at offset {} (wanted {} bytes)",
                    self.pos, len
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, ProtocolError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub fn varint(&mut self) -> Result<u64, ProtocolError> {
        match self.u8()? {
            0xfd => Ok(self.u16()? as u64),
            0xfe => Ok(self.u32()? as u64),
            0xff => self.u64(),
            v => Ok(v as u64),
        }
    }

    /// Varint used as an element count. Never exceeds the remaining input.
    pub fn count(&mut self) -> Result<usize, ProtocolError> {
        let n = self.varint()?;
        if n > self.remaining() as u64 {
            return Err(ProtocolError::Decoding(format!(
                "count {} exceeds remaining {} bytes",
                n,
                self.remaining()
            )));
        }
        Ok(n as usize)
    }

    pub fn hash(&mut self) -> Result<[u8; 32], ProtocolError> {
        self.array()
    }

    pub fn fixed<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.array()
    }

    /// Length-prefixed byte string.
    pub fn bytes(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let len = self.count()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fail if anything is left unread.
    pub fn finish(self) -> Result<(), ProtocolError> {
        if self.remaining() != 0 {
            return Err(ProtocolError::Decoding(format!(
                "{} trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }
}
