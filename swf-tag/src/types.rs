//! Bit-packed SWF primitive types
//!
//! Coordinates are twips (1/20 px). Matrix scale/rotate terms are 16.16
//! fixed point; color-transform coefficients are 8.8 fixed point where
//! 256 = 1.0.

use crate::error::SwfError;
use crate::reader::SwfReader;
use crate::FIXED_ONE;

/// Axis-aligned bounds in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Rect {
    /// Decode a bit-packed RECT (aligned to the next byte on entry)
    pub fn decode(r: &mut SwfReader<'_>) -> Result<Self, SwfError> {
        r.align();
        let nbits = r.read_bits(5)? as u8;
        let x_min = r.read_sbits(nbits)?;
        let x_max = r.read_sbits(nbits)?;
        let y_min = r.read_sbits(nbits)?;
        let y_max = r.read_sbits(nbits)?;
        r.align();
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }
}

/// 2D affine transform: 16.16 fixed scale/rotate terms, twip translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix {
    pub sx: i32,
    pub sy: i32,
    /// RotateSkew0 (first rotate term on the wire)
    pub r0: i32,
    /// RotateSkew1
    pub r1: i32,
    pub tx: i32,
    pub ty: i32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            sx: FIXED_ONE,
            sy: FIXED_ONE,
            r0: 0,
            r1: 0,
            tx: 0,
            ty: 0,
        }
    }
}

impl Matrix {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Decode a bit-packed MATRIX (aligned to the next byte on entry)
    pub fn decode(r: &mut SwfReader<'_>) -> Result<Self, SwfError> {
        r.align();
        let mut m = Self::default();
        if r.read_bit()? {
            let nbits = r.read_bits(5)? as u8;
            m.sx = r.read_sbits(nbits)?;
            m.sy = r.read_sbits(nbits)?;
        }
        if r.read_bit()? {
            let nbits = r.read_bits(5)? as u8;
            m.r0 = r.read_sbits(nbits)?;
            m.r1 = r.read_sbits(nbits)?;
        }
        let nbits = r.read_bits(5)? as u8;
        m.tx = r.read_sbits(nbits)?;
        m.ty = r.read_sbits(nbits)?;
        r.align();
        Ok(m)
    }
}

/// Color transform: per-channel 8.8 multiply plus signed additive term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cxform {
    pub r_mult: i16,
    pub g_mult: i16,
    pub b_mult: i16,
    pub a_mult: i16,
    pub r_add: i16,
    pub g_add: i16,
    pub b_add: i16,
    pub a_add: i16,
}

impl Default for Cxform {
    fn default() -> Self {
        Self {
            r_mult: 256,
            g_mult: 256,
            b_mult: 256,
            a_mult: 256,
            r_add: 0,
            g_add: 0,
            b_add: 0,
            a_add: 0,
        }
    }
}

impl Cxform {
    /// Decode a bit-packed CXFORM; `with_alpha` selects the 4-channel form
    pub fn decode(r: &mut SwfReader<'_>, with_alpha: bool) -> Result<Self, SwfError> {
        r.align();
        let has_add = r.read_bit()?;
        let has_mult = r.read_bit()?;
        let nbits = r.read_bits(4)? as u8;
        let mut cx = Self::default();
        if has_mult {
            cx.r_mult = r.read_sbits(nbits)? as i16;
            cx.g_mult = r.read_sbits(nbits)? as i16;
            cx.b_mult = r.read_sbits(nbits)? as i16;
            if with_alpha {
                cx.a_mult = r.read_sbits(nbits)? as i16;
            }
        }
        if has_add {
            cx.r_add = r.read_sbits(nbits)? as i16;
            cx.g_add = r.read_sbits(nbits)? as i16;
            cx.b_add = r.read_sbits(nbits)? as i16;
            if with_alpha {
                cx.a_add = r.read_sbits(nbits)? as i16;
            }
        }
        r.align();
        Ok(cx)
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Decode RGB (alpha forced opaque) or RGBA depending on `with_alpha`
    pub fn decode(r: &mut SwfReader<'_>, with_alpha: bool) -> Result<Self, SwfError> {
        let red = r.read_u8()?;
        let g = r.read_u8()?;
        let b = r.read_u8()?;
        let a = if with_alpha { r.read_u8()? } else { 255 };
        Ok(Self { r: red, g, b, a })
    }
}
