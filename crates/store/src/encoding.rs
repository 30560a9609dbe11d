//! Encoding/decoding traits for stored keys and values
//!
//! Keys encode to byte sequences whose lexicographic order matches the
//! logical order of the value (big-endian integers), so ordered scans over a
//! table come back in id order without any post-sorting.

use crate::error::{Error, Result};

/// Encode a value to bytes
pub trait Encode {
    fn encode(&self) -> Result<Vec<u8>>;
}

/// Decode a value from bytes
pub trait Decode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self>;
}

impl Encode for u64 {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_be_bytes().to_vec())
    }
}

impl Decode for u64 {
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 8 {
            return Err(Error::Encoding(format!(
                "expected 8 bytes for u64, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }
}

impl Encode for () {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

impl Decode for () {
    fn decode(_bytes: &[u8]) -> Result<Self> {
        Ok(())
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl Decode for String {
    fn decode(bytes: &[u8]) -> Result<Self> {
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Encoding(e.to_string()))
    }
}

/// Sequential reader over an encoded buffer.
///
/// Every accessor fails loudly on truncation; a value that decodes short is
/// corrupt, never silently defaulted.
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(Error::Encoding(format!(
                "truncated value: wanted {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.bytes.len() - self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let slice = self.take(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(slice);
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let slice = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(slice);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Read a u32-length-prefixed byte sequence.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Read an optional u32-length-prefixed string (tag byte 0 = absent).
    pub fn read_opt_string(&mut self) -> Result<Option<String>> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.read_string()?)),
            tag => Err(Error::Encoding(format!("invalid option tag {tag}"))),
        }
    }

    pub fn read_opt_i64(&mut self) -> Result<Option<i64>> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.read_i64()?)),
            tag => Err(Error::Encoding(format!("invalid option tag {tag}"))),
        }
    }

    /// True when the whole buffer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

/// Append helpers mirroring [`Reader`].
pub fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&(v as u64).to_be_bytes());
}

pub fn put_bytes(buf: &mut Vec<u8>, v: &[u8]) {
    put_u32(buf, v.len() as u32);
    buf.extend_from_slice(v);
}

pub fn put_string(buf: &mut Vec<u8>, v: &str) {
    put_bytes(buf, v.as_bytes());
}

pub fn put_opt_string(buf: &mut Vec<u8>, v: Option<&str>) {
    match v {
        None => put_u8(buf, 0),
        Some(s) => {
            put_u8(buf, 1);
            put_string(buf, s);
        }
    }
}

pub fn put_opt_i64(buf: &mut Vec<u8>, v: Option<i64>) {
    match v {
        None => put_u8(buf, 0),
        Some(n) => {
            put_u8(buf, 1);
            put_i64(buf, n);
        }
    }
}
