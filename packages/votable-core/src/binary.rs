//! Byte-level helpers for the BINARY serialization.
//!
//! All multi-byte quantities in a VOTable BINARY stream are big-endian.

use crate::error::{Result, VoError};

/// Cursor over an in-memory BINARY stream.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reads exactly `len` bytes.
    ///
    /// # Returns
    /// The bytes, or `UnexpectedEof` if fewer than `len` remain. The cursor
    /// does not move on failure.
    pub fn read(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(VoError::UnexpectedEof {
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read(N)?);
        Ok(buf)
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    /// Reads a 4-byte big-endian length prefix.
    pub fn read_length(&mut self) -> Result<usize> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?) as usize)
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current offset from the start of the stream.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Appends a 4-byte big-endian length prefix.
///
/// # Returns
/// Number of bytes written (always 4).
pub fn write_length(out: &mut Vec<u8>, length: usize) -> Result<usize> {
    let length = u32::try_from(length).map_err(|_| VoError::OutOfRange {
        datatype: "length prefix".to_string(),
        value: length.to_string(),
    })?;
    out.extend_from_slice(&length.to_be_bytes());
    Ok(4)
}

/// Packs booleans MSB-first into `ceil(bits.len() / 8)` bytes.
pub fn pack_bits(bits: impl IntoIterator<Item = bool>, out: &mut Vec<u8>) {
    let mut byte = 0u8;
    let mut bit_no = 7i32;
    for bit in bits {
        if bit {
            byte |= 1 << bit_no;
        }
        if bit_no == 0 {
            out.push(byte);
            byte = 0;
            bit_no = 7;
        } else {
            bit_no -= 1;
        }
    }
    if bit_no != 7 {
        out.push(byte);
    }
}

/// Unpacks `count` MSB-first bits from `bytes`.
pub fn unpack_bits(bytes: &[u8], count: usize) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |bit_no| byte & (1 << bit_no) != 0))
        .take(count)
        .collect()
}

/// Returns the number of bytes needed to pack `bits` bits.
pub fn packed_len(bits: usize) -> usize {
    bits.div_ceil(8)
}
