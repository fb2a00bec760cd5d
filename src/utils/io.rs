// I/O utilities for reading packets and pages

use std::io::{self, Read};

/// Bounds-checked forward cursor over a packet buffer.
///
/// Every read is clamped to the bytes that remain, so a declared length
/// larger than the buffer yields `None` instead of reading past the end.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Take the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Read little-endian 32-bit integer
    pub fn read_le_u32(&mut self) -> Option<u32> {
        let bytes = self.read_bytes(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian 32-bit length followed by that many bytes
    pub fn read_prefixed(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let len = self.read_le_u32()? as usize;
        match self.read_bytes(len) {
            Some(bytes) => Some(bytes),
            None => {
                self.pos = start;
                None
            }
        }
    }
}

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read, which is less than `buf.len()` only if
/// the input ended.
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
