//! Big-endian cell reader over a borrowed payload slice

use crate::types::{NutError, Result};
use byteorder::{BigEndian, ByteOrder};
use num_complex::Complex64;

/// Cursor over the binary region of a plot segment
///
/// The slice usually borrows the memory-mapped file; every read copies the
/// cells out into native-endian values.
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(NutError::Format(format!(
                "payload truncated: need {} bytes at offset {}, have {}",
                count,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Borrow one whole record of `size` bytes
    #[inline]
    pub fn read_record(&mut self, size: usize) -> Result<&'a [u8]> {
        self.read_bytes(size)
    }
}

/// Decode one real cell at `offset` inside a record
#[inline]
pub fn real_at(record: &[u8], offset: usize) -> f64 {
    BigEndian::read_f64(&record[offset..offset + 8])
}

/// Decode one complex cell at `offset` inside a record
#[inline]
pub fn complex_at(record: &[u8], offset: usize) -> Complex64 {
    Complex64::new(
        BigEndian::read_f64(&record[offset..offset + 8]),
        BigEndian::read_f64(&record[offset + 8..offset + 16]),
    )
}
