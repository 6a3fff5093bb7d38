//! SWF byte builders
//!
//! Synthesizes containers and tag payloads, primarily for tests and
//! tooling. Mirrors the decoders in this crate: whatever these functions
//! emit, the parsers read back.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::types::{Cxform, Matrix, Rect, Rgba};
use crate::{FIXED_ONE, TWIPS_PER_PIXEL};

/// MSB-first bit writer, the counterpart of `SwfReader`'s bit access
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    pub fn write_bits(&mut self, value: u32, n: u8) {
        for i in (0..n).rev() {
            let bit = (value >> i) & 1;
            self.current = (self.current << 1) | bit as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    pub fn write_sbits(&mut self, value: i32, n: u8) {
        self.write_bits(value as u32 & ((1u64 << n) - 1) as u32, n);
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    pub fn align(&mut self) {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
            self.current = 0;
            self.filled = 0;
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.align();
        self.bytes.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.align();
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.bytes.extend_from_slice(bytes);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.bytes
    }

    /// Bit width needed to hold every value as a signed field
    pub fn sbits_needed(values: &[i32]) -> u8 {
        let mut n = 1u8;
        for &v in values {
            while n < 32 && !(v >= -(1i64 << (n - 1)) as i32 && (i64::from(v)) < (1i64 << (n - 1)))
            {
                n += 1;
            }
        }
        n
    }

    pub fn write_rect(&mut self, rect: &Rect) {
        let nbits = Self::sbits_needed(&[rect.x_min, rect.x_max, rect.y_min, rect.y_max]);
        self.write_bits(u32::from(nbits), 5);
        self.write_sbits(rect.x_min, nbits);
        self.write_sbits(rect.x_max, nbits);
        self.write_sbits(rect.y_min, nbits);
        self.write_sbits(rect.y_max, nbits);
        self.align();
    }

    pub fn write_matrix(&mut self, m: &Matrix) {
        let has_scale = m.sx != FIXED_ONE || m.sy != FIXED_ONE;
        self.write_bit(has_scale);
        if has_scale {
            let nbits = Self::sbits_needed(&[m.sx, m.sy]);
            self.write_bits(u32::from(nbits), 5);
            self.write_sbits(m.sx, nbits);
            self.write_sbits(m.sy, nbits);
        }
        let has_rotate = m.r0 != 0 || m.r1 != 0;
        self.write_bit(has_rotate);
        if has_rotate {
            let nbits = Self::sbits_needed(&[m.r0, m.r1]);
            self.write_bits(u32::from(nbits), 5);
            self.write_sbits(m.r0, nbits);
            self.write_sbits(m.r1, nbits);
        }
        let nbits = if m.tx == 0 && m.ty == 0 {
            0
        } else {
            Self::sbits_needed(&[m.tx, m.ty])
        };
        self.write_bits(u32::from(nbits), 5);
        self.write_sbits(m.tx, nbits);
        self.write_sbits(m.ty, nbits);
        self.align();
    }

    pub fn write_cxform(&mut self, cx: &Cxform, with_alpha: bool) {
        let has_mult = cx.r_mult != 256 || cx.g_mult != 256 || cx.b_mult != 256
            || (with_alpha && cx.a_mult != 256);
        let has_add = cx.r_add != 0 || cx.g_add != 0 || cx.b_add != 0
            || (with_alpha && cx.a_add != 0);
        let mut values = Vec::new();
        if has_mult {
            values.extend_from_slice(&[
                i32::from(cx.r_mult),
                i32::from(cx.g_mult),
                i32::from(cx.b_mult),
            ]);
            if with_alpha {
                values.push(i32::from(cx.a_mult));
            }
        }
        if has_add {
            values.extend_from_slice(&[
                i32::from(cx.r_add),
                i32::from(cx.g_add),
                i32::from(cx.b_add),
            ]);
            if with_alpha {
                values.push(i32::from(cx.a_add));
            }
        }
        let nbits = if values.is_empty() {
            0
        } else {
            Self::sbits_needed(&values)
        };
        self.write_bit(has_add);
        self.write_bit(has_mult);
        self.write_bits(u32::from(nbits), 4);
        if has_mult {
            self.write_sbits(i32::from(cx.r_mult), nbits);
            self.write_sbits(i32::from(cx.g_mult), nbits);
            self.write_sbits(i32::from(cx.b_mult), nbits);
            if with_alpha {
                self.write_sbits(i32::from(cx.a_mult), nbits);
            }
        }
        if has_add {
            self.write_sbits(i32::from(cx.r_add), nbits);
            self.write_sbits(i32::from(cx.g_add), nbits);
            self.write_sbits(i32::from(cx.b_add), nbits);
            if with_alpha {
                self.write_sbits(i32::from(cx.a_add), nbits);
            }
        }
        self.align();
    }
}

// =============================================================================
// Tag and container builders
// =============================================================================

/// Wrap a payload in a tag header (long form when the payload demands it)
pub fn tag(code: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 6);
    if body.len() < 0x3F {
        out.extend_from_slice(&((code << 6) | body.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&((code << 6) | 0x3F).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(body);
    out
}

/// Pixel-coordinate RECT helper (converts to twips)
pub fn rect_px(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Rect {
    Rect {
        x_min: x_min * TWIPS_PER_PIXEL,
        x_max: x_max * TWIPS_PER_PIXEL,
        y_min: y_min * TWIPS_PER_PIXEL,
        y_max: y_max * TWIPS_PER_PIXEL,
    }
}

fn swf_body(movie_size: Rect, frame_rate: u16, frame_count: u16, tag_chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_rect(&movie_size);
    w.write_u16(frame_rate);
    w.write_u16(frame_count);
    let mut body = w.finish();
    for chunk in tag_chunks {
        body.extend_from_slice(chunk);
    }
    body
}

/// Build an uncompressed (`FWS`) container
pub fn swf(
    version: u8,
    frame_rate: u16,
    frame_count: u16,
    movie_size: Rect,
    tag_chunks: &[Vec<u8>],
) -> Vec<u8> {
    let body = swf_body(movie_size, frame_rate, frame_count, tag_chunks);
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"FWS");
    out.push(version);
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// Build a zlib-compressed (`CWS`) container
pub fn swf_compressed(
    version: u8,
    frame_rate: u16,
    frame_count: u16,
    movie_size: Rect,
    tag_chunks: &[Vec<u8>],
) -> Vec<u8> {
    let body = swf_body(movie_size, frame_rate, frame_count, tag_chunks);
    let mut out = Vec::new();
    out.extend_from_slice(b"CWS");
    out.push(version);
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    let mut encoder = ZlibEncoder::new(&mut out, Compression::default());
    encoder.write_all(&body).expect("zlib encode");
    encoder.finish().expect("zlib finish");
    out
}

// =============================================================================
// Display-list payload builders
// =============================================================================

/// Legacy PlaceObject payload (fields always present)
pub fn place_object1_body(
    character_id: u16,
    depth: u16,
    matrix: &Matrix,
    cxform: Option<&Cxform>,
) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_u16(character_id);
    w.write_u16(depth);
    w.write_matrix(matrix);
    if let Some(cx) = cxform {
        w.write_cxform(cx, false);
    }
    w.finish()
}

/// PlaceObject2 payload driven by its flag byte
pub fn place_object2_body(
    flags: u8,
    depth: u16,
    character_id: Option<u16>,
    matrix: Option<&Matrix>,
    cxform: Option<&Cxform>,
) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_u8(flags);
    w.write_u16(depth);
    if let Some(id) = character_id {
        w.write_u16(id);
    }
    if let Some(m) = matrix {
        w.write_matrix(m);
    }
    if let Some(cx) = cxform {
        w.write_cxform(cx, true);
    }
    w.finish()
}

// =============================================================================
// Shape builders
// =============================================================================

/// Wire fill style for the shape builders
pub enum WireFill {
    Solid(Rgba),
    /// Clipped bitmap fill (type 0x41)
    Bitmap(u16, Matrix),
}

/// Outline record for the shape builders (absolute twips)
#[derive(Clone, Copy)]
pub enum WireEdge {
    Move(i32, i32),
    Line(i32, i32),
    /// Control and anchor deltas
    Curve(i32, i32, i32, i32),
}

/// Closed axis-aligned rectangle outline
pub fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<WireEdge> {
    vec![
        WireEdge::Move(x0, y0),
        WireEdge::Line(x1, y0),
        WireEdge::Line(x1, y1),
        WireEdge::Line(x0, y1),
        WireEdge::Line(x0, y0),
    ]
}

/// Generic DefineShape1-4 builder
pub fn define_shape(
    code: u16,
    id: u16,
    bounds: &Rect,
    fills: &[WireFill],
    line_style_width: Option<u16>,
    edges: &[WireEdge],
) -> Vec<u8> {
    let with_alpha = code == 32 || code == 83;
    let mut w = BitWriter::new();
    w.write_u16(id);
    w.write_rect(bounds);
    if code == 83 {
        w.write_rect(bounds); // edge bounds
        w.write_u8(0);
    }

    w.write_u8(fills.len() as u8);
    for fill in fills {
        match fill {
            WireFill::Solid(color) => {
                w.write_u8(0x00);
                w.write_u8(color.r);
                w.write_u8(color.g);
                w.write_u8(color.b);
                if with_alpha {
                    w.write_u8(color.a);
                }
            }
            WireFill::Bitmap(bitmap_id, matrix) => {
                w.write_u8(0x41);
                w.write_u16(*bitmap_id);
                w.write_matrix(matrix);
            }
        }
    }
    match line_style_width {
        None => w.write_u8(0),
        Some(width) => {
            w.write_u8(1);
            w.write_u16(width);
            w.write_u8(0); // r
            w.write_u8(0); // g
            w.write_u8(0); // b
            if with_alpha {
                w.write_u8(255);
            }
        }
    }

    let fill_bits = 4u8;
    let line_bits = 4u8;
    w.write_bits(u32::from(fill_bits), 4);
    w.write_bits(u32::from(line_bits), 4);

    let mut x = 0i32;
    let mut y = 0i32;
    let mut first = true;
    for edge in edges {
        match *edge {
            WireEdge::Move(mx, my) => {
                w.write_bit(false);
                // state: moveTo + fillStyle1 select on the first record
                if first {
                    w.write_bits(0b00101, 5);
                } else {
                    w.write_bits(0b00001, 5);
                }
                let nbits = BitWriter::sbits_needed(&[mx, my]);
                w.write_bits(u32::from(nbits), 5);
                w.write_sbits(mx, nbits);
                w.write_sbits(my, nbits);
                if first {
                    w.write_bits(1, fill_bits); // first fill style
                }
                x = mx;
                y = my;
            }
            WireEdge::Line(lx, ly) => {
                let dx = lx - x;
                let dy = ly - y;
                w.write_bit(true);
                w.write_bit(true);
                let nbits = BitWriter::sbits_needed(&[dx, dy]).max(2);
                w.write_bits(u32::from(nbits - 2), 4);
                w.write_bit(true); // general line
                w.write_sbits(dx, nbits);
                w.write_sbits(dy, nbits);
                x = lx;
                y = ly;
            }
            WireEdge::Curve(cx, cy, ax, ay) => {
                w.write_bit(true);
                w.write_bit(false);
                let nbits = BitWriter::sbits_needed(&[cx, cy, ax, ay]).max(2);
                w.write_bits(u32::from(nbits - 2), 4);
                w.write_sbits(cx, nbits);
                w.write_sbits(cy, nbits);
                w.write_sbits(ax, nbits);
                w.write_sbits(ay, nbits);
                x += cx + ax;
                y += cy + ay;
            }
        }
        first = false;
    }
    // End-of-shape record
    w.write_bit(false);
    w.write_bits(0, 5);
    w.align();

    tag(code, &w.finish())
}

/// Bitmap-filled axis-aligned rectangle shape
pub fn define_shape_bitmap_rect(
    code: u16,
    id: u16,
    bitmap_id: u16,
    matrix: &Matrix,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Vec<u8> {
    let bounds = Rect {
        x_min: x0,
        x_max: x1,
        y_min: y0,
        y_max: y1,
    };
    define_shape(
        code,
        id,
        &bounds,
        &[WireFill::Bitmap(bitmap_id, *matrix)],
        None,
        &rect_outline(x0, y0, x1, y1),
    )
}

/// Solid-filled axis-aligned rectangle shape
pub fn define_shape_solid_rect(
    code: u16,
    id: u16,
    color: Rgba,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> Vec<u8> {
    let bounds = Rect {
        x_min: x0,
        x_max: x1,
        y_min: y0,
        y_max: y1,
    };
    define_shape(
        code,
        id,
        &bounds,
        &[WireFill::Solid(color)],
        None,
        &rect_outline(x0, y0, x1, y1),
    )
}

/// Rectangle shape carrying one line style (unsupported downstream)
pub fn define_shape_with_line_style(id: u16, width: u16) -> Vec<u8> {
    let bounds = rect_px(0, 0, 10, 10);
    define_shape(
        2,
        id,
        &bounds,
        &[WireFill::Solid(Rgba {
            r: 1,
            g: 2,
            b: 3,
            a: 255,
        })],
        Some(width),
        &rect_outline(0, 0, 200, 200),
    )
}

/// Shape whose outline contains a curved edge
pub fn define_shape_with_curve(id: u16) -> Vec<u8> {
    let bounds = rect_px(0, 0, 10, 10);
    define_shape(
        2,
        id,
        &bounds,
        &[WireFill::Solid(Rgba {
            r: 1,
            g: 2,
            b: 3,
            a: 255,
        })],
        None,
        &[
            WireEdge::Move(0, 0),
            WireEdge::Curve(50, 0, 50, 100),
            WireEdge::Line(0, 0),
        ],
    )
}

// =============================================================================
// Bitmap builders
// =============================================================================

/// DefineBitsLossless tag with 32-bit (A)RGB pixel data
///
/// `alpha` selects DefineBitsLossless2; pixels are provided straight
/// (un-premultiplied) and premultiplied here when `alpha` is set, matching
/// what authoring tools emit.
pub fn define_bits_lossless_32(id: u16, width: u16, height: u16, pixels: &[Rgba], alpha: bool) -> Vec<u8> {
    assert_eq!(pixels.len(), width as usize * height as usize);
    let mut raw = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        if alpha {
            let mul = |c: u8| ((u16::from(c) * u16::from(p.a)) / 255) as u8;
            raw.extend_from_slice(&[p.a, mul(p.r), mul(p.g), mul(p.b)]);
        } else {
            raw.extend_from_slice(&[255, p.r, p.g, p.b]);
        }
    }
    let mut compressed = Vec::new();
    let mut encoder = ZlibEncoder::new(&mut compressed, Compression::default());
    encoder.write_all(&raw).expect("zlib encode");
    encoder.finish().expect("zlib finish");

    let mut body = Vec::new();
    body.extend_from_slice(&id.to_le_bytes());
    body.push(5); // 1 << 5 = 32 bpp
    body.extend_from_slice(&width.to_le_bytes());
    body.extend_from_slice(&height.to_le_bytes());
    body.extend_from_slice(&compressed);
    tag(if alpha { 36 } else { 20 }, &body)
}
