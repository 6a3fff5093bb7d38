//! Byte- and bit-level reading over an SWF payload
//!
//! SWF mixes little-endian integers with MSB-first bit fields. A single
//! reader tracks both: byte reads implicitly re-align to the next byte
//! boundary, bit reads consume the pending byte one bit at a time.

use crate::error::SwfError;

/// Sequential reader over a tag payload or container body
pub struct SwfReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Bits of `data[pos - 1]` not yet consumed (0 = byte aligned)
    bit_pos: u8,
}

impl<'a> SwfReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_pos: 0,
        }
    }

    /// Bytes not yet consumed (after re-aligning)
    pub fn remaining(&mut self) -> &'a [u8] {
        self.align();
        &self.data[self.pos..]
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Discard any partially consumed byte
    pub fn align(&mut self) {
        self.bit_pos = 0;
    }

    pub fn skip(&mut self, n: usize) -> Result<(), SwfError> {
        self.align();
        if self.data.len() - self.pos < n {
            return Err(SwfError::UnexpectedEof);
        }
        self.pos += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, SwfError> {
        self.align();
        let b = *self.data.get(self.pos).ok_or(SwfError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, SwfError> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn read_i16(&mut self) -> Result<i16, SwfError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, SwfError> {
        let mut buf = [0u8; 4];
        for b in &mut buf {
            *b = self.read_u8()?;
        }
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], SwfError> {
        self.align();
        if self.data.len() - self.pos < n {
            return Err(SwfError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a null-terminated byte string (the terminator is consumed)
    pub fn read_cstr(&mut self) -> Result<&'a [u8], SwfError> {
        self.align();
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(SwfError::UnexpectedEof)?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    /// Read `n` bits MSB-first as an unsigned value (n <= 32)
    pub fn read_bits(&mut self, n: u8) -> Result<u32, SwfError> {
        debug_assert!(n <= 32);
        let mut value = 0u32;
        for _ in 0..n {
            if self.bit_pos == 0 {
                if self.pos >= self.data.len() {
                    return Err(SwfError::UnexpectedEof);
                }
                self.pos += 1;
                self.bit_pos = 8;
            }
            self.bit_pos -= 1;
            let byte = self.data[self.pos - 1];
            value = (value << 1) | u32::from((byte >> self.bit_pos) & 1);
        }
        Ok(value)
    }

    /// Read `n` bits MSB-first as a sign-extended value
    pub fn read_sbits(&mut self, n: u8) -> Result<i32, SwfError> {
        if n == 0 {
            return Ok(0);
        }
        let raw = self.read_bits(n)?;
        let shift = 32 - n;
        Ok(((raw << shift) as i32) >> shift)
    }

    pub fn read_bit(&mut self) -> Result<bool, SwfError> {
        Ok(self.read_bits(1)? != 0)
    }
}
