//! DefineShape payload decoding
//!
//! Decodes the four DefineShape generations into a flat fill-style list and
//! an absolute-coordinate edge list. Fill/line style *selection* records are
//! skipped: the converter only needs the style inventory and the outline
//! geometry. Curved edges are kept as [`ShapeEdge::Curve`] markers so the
//! consumer can classify them as unsupported vector geometry.

use crate::error::SwfError;
use crate::reader::SwfReader;
use crate::tag::{Tag, TagCode};
use crate::types::{Matrix, Rect, Rgba};

/// Classified fill style
#[derive(Debug, Clone, PartialEq)]
pub enum FillKind {
    /// Flat color fill (type 0x00)
    Solid(Rgba),
    /// Bitmap fill (types 0x40-0x43): character id + placement matrix
    Bitmap { id: u16, matrix: Matrix },
    /// Anything else (gradients); unrepresentable in SAM
    Other,
}

/// One fill style with its raw wire type byte (kept for diagnostics)
#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    pub type_byte: u8,
    pub kind: FillKind,
}

/// One outline record with accumulated absolute twip coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeEdge {
    MoveTo { x: i32, y: i32 },
    LineTo { x: i32, y: i32 },
    /// Quadratic spline edge; position advances to the anchor point
    Curve { x: i32, y: i32 },
}

impl ShapeEdge {
    pub fn point(&self) -> (i32, i32) {
        match *self {
            ShapeEdge::MoveTo { x, y }
            | ShapeEdge::LineTo { x, y }
            | ShapeEdge::Curve { x, y } => (x, y),
        }
    }
}

/// Decoded shape definition
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDef {
    pub id: u16,
    /// Declared bounds in twips
    pub bounds: Rect,
    pub fill_styles: Vec<FillStyle>,
    /// Only the count matters: any line style is unsupported downstream
    pub line_style_count: usize,
    pub edges: Vec<ShapeEdge>,
}

/// Which DefineShape generation a tag is (affects color/style layouts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeGen {
    Shape1,
    Shape2,
    Shape3,
    Shape4,
}

impl ShapeGen {
    fn of(code: u16) -> Option<Self> {
        match TagCode::from_u16(code)? {
            TagCode::DefineShape => Some(Self::Shape1),
            TagCode::DefineShape2 => Some(Self::Shape2),
            TagCode::DefineShape3 => Some(Self::Shape3),
            TagCode::DefineShape4 => Some(Self::Shape4),
            _ => None,
        }
    }

    fn has_alpha_colors(self) -> bool {
        matches!(self, Self::Shape3 | Self::Shape4)
    }

    fn has_extended_counts(self) -> bool {
        !matches!(self, Self::Shape1)
    }
}

/// Decode any DefineShape1-4 tag
pub fn decode_define_shape(tag: &Tag<'_>) -> Result<ShapeDef, SwfError> {
    let gen = ShapeGen::of(tag.code).ok_or(SwfError::BadTagData("not a shape tag"))?;
    let mut r = SwfReader::new(tag.body);

    let id = r.read_u16()?;
    let bounds = Rect::decode(&mut r)?;
    if gen == ShapeGen::Shape4 {
        Rect::decode(&mut r)?; // edge bounds
        r.read_u8()?; // uses-fill-winding / scaling-strokes flags
    }

    let mut fill_styles = Vec::new();
    let mut line_style_count = 0usize;
    read_style_arrays(&mut r, gen, &mut fill_styles, &mut line_style_count)?;

    let mut fill_bits = r.read_bits(4)? as u8;
    let mut line_bits = r.read_bits(4)? as u8;

    let mut edges = Vec::new();
    let mut x = 0i32;
    let mut y = 0i32;

    loop {
        if !r.read_bit()? {
            // Style-change or end-of-shape record
            let state = r.read_bits(5)? as u8;
            if state == 0 {
                break;
            }
            let new_styles = state & 0x10 != 0;
            let line_style = state & 0x08 != 0;
            let fill_style1 = state & 0x04 != 0;
            let fill_style0 = state & 0x02 != 0;
            let move_to = state & 0x01 != 0;

            if move_to {
                let nbits = r.read_bits(5)? as u8;
                x = r.read_sbits(nbits)?;
                y = r.read_sbits(nbits)?;
                edges.push(ShapeEdge::MoveTo { x, y });
            }
            if fill_style0 {
                r.read_bits(fill_bits)?;
            }
            if fill_style1 {
                r.read_bits(fill_bits)?;
            }
            if line_style {
                r.read_bits(line_bits)?;
            }
            if new_styles {
                if !gen.has_extended_counts() {
                    return Err(SwfError::BadTagData("new styles in DefineShape"));
                }
                read_style_arrays(&mut r, gen, &mut fill_styles, &mut line_style_count)?;
                fill_bits = r.read_bits(4)? as u8;
                line_bits = r.read_bits(4)? as u8;
            }
        } else if r.read_bit()? {
            // Straight edge
            let nbits = r.read_bits(4)? as u8 + 2;
            if r.read_bit()? {
                x += r.read_sbits(nbits)?;
                y += r.read_sbits(nbits)?;
            } else if r.read_bit()? {
                y += r.read_sbits(nbits)?;
            } else {
                x += r.read_sbits(nbits)?;
            }
            edges.push(ShapeEdge::LineTo { x, y });
        } else {
            // Curved edge: control + anchor deltas
            let nbits = r.read_bits(4)? as u8 + 2;
            let cx = r.read_sbits(nbits)?;
            let cy = r.read_sbits(nbits)?;
            let ax = r.read_sbits(nbits)?;
            let ay = r.read_sbits(nbits)?;
            x += cx + ax;
            y += cy + ay;
            edges.push(ShapeEdge::Curve { x, y });
        }
    }

    Ok(ShapeDef {
        id,
        bounds,
        fill_styles,
        line_style_count,
        edges,
    })
}

fn read_style_arrays(
    r: &mut SwfReader<'_>,
    gen: ShapeGen,
    fill_styles: &mut Vec<FillStyle>,
    line_style_count: &mut usize,
) -> Result<(), SwfError> {
    r.align();
    let fill_count = read_style_count(r, gen)?;
    for _ in 0..fill_count {
        fill_styles.push(read_fill_style(r, gen)?);
    }
    let line_count = read_style_count(r, gen)?;
    for _ in 0..line_count {
        skip_line_style(r, gen)?;
    }
    *line_style_count += line_count;
    Ok(())
}

fn read_style_count(r: &mut SwfReader<'_>, gen: ShapeGen) -> Result<usize, SwfError> {
    let count = r.read_u8()?;
    if count == 0xFF && gen.has_extended_counts() {
        Ok(r.read_u16()? as usize)
    } else {
        Ok(count as usize)
    }
}

fn read_fill_style(r: &mut SwfReader<'_>, gen: ShapeGen) -> Result<FillStyle, SwfError> {
    let type_byte = r.read_u8()?;
    let kind = match type_byte {
        0x00 => FillKind::Solid(Rgba::decode(r, gen.has_alpha_colors())?),
        0x10 | 0x11 | 0x12 | 0x13 => {
            // Gradient: matrix, record array, focal point for 0x13
            Matrix::decode(r)?;
            let head = r.read_u8()?;
            let records = head & 0x0F;
            for _ in 0..records {
                r.read_u8()?; // ratio
                Rgba::decode(r, gen.has_alpha_colors())?;
            }
            if type_byte == 0x13 {
                r.read_u16()?; // focal point, 8.8 fixed
            }
            FillKind::Other
        }
        0x40 | 0x41 | 0x42 | 0x43 => {
            let id = r.read_u16()?;
            let matrix = Matrix::decode(r)?;
            FillKind::Bitmap { id, matrix }
        }
        _ => return Err(SwfError::BadTagData("fill style type")),
    };
    Ok(FillStyle { type_byte, kind })
}

fn skip_line_style(r: &mut SwfReader<'_>, gen: ShapeGen) -> Result<(), SwfError> {
    r.read_u16()?; // width
    if gen == ShapeGen::Shape4 {
        // LINESTYLE2
        let flags = r.read_u16()?;
        let join_style = (flags >> 4) & 0x03;
        let has_fill = flags & 0x08 != 0;
        if join_style == 2 {
            r.read_u16()?; // miter limit
        }
        if has_fill {
            read_fill_style(r, gen)?;
        } else {
            Rgba::decode(r, true)?;
        }
    } else {
        Rgba::decode(r, gen.has_alpha_colors())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;

    fn parse_single(bytes: &[u8]) -> ShapeDef {
        let tag = crate::tag::TagStream::new(bytes).next().unwrap().unwrap();
        decode_define_shape(&tag).unwrap()
    }

    #[test]
    fn test_bitmap_rectangle_shape() {
        let matrix = Matrix {
            sx: crate::FIXED_ONE * crate::TWIPS_PER_PIXEL,
            sy: crate::FIXED_ONE * crate::TWIPS_PER_PIXEL,
            ..Default::default()
        };
        let bytes = build::define_shape_bitmap_rect(TagCode::DefineShape as u16, 3, 1, &matrix, 0, 0, 640, 640);
        let def = parse_single(&bytes);
        assert_eq!(def.id, 3);
        assert_eq!(def.fill_styles.len(), 1);
        assert!(matches!(
            def.fill_styles[0].kind,
            FillKind::Bitmap { id: 1, .. }
        ));
        assert_eq!(def.line_style_count, 0);
        // moveTo + 4 lineTo edges closing the rectangle
        assert_eq!(def.edges.len(), 5);
        assert_eq!(def.edges[0], ShapeEdge::MoveTo { x: 0, y: 0 });
        assert_eq!(def.edges[4], ShapeEdge::LineTo { x: 0, y: 0 });
    }

    #[test]
    fn test_solid_fill_colors_by_generation() {
        let color = Rgba {
            r: 10,
            g: 20,
            b: 30,
            a: 200,
        };
        // Shape3 keeps the alpha byte
        let bytes = build::define_shape_solid_rect(TagCode::DefineShape3 as u16, 5, color, 0, 0, 100, 100);
        let def = parse_single(&bytes);
        match &def.fill_styles[0].kind {
            FillKind::Solid(c) => assert_eq!(*c, color),
            other => panic!("expected solid fill, got {:?}", other),
        }
        // Shape1 colors are RGB; alpha reads back opaque
        let bytes = build::define_shape_solid_rect(TagCode::DefineShape as u16, 5, color, 0, 0, 100, 100);
        let def = parse_single(&bytes);
        match &def.fill_styles[0].kind {
            FillKind::Solid(c) => assert_eq!(c.a, 255),
            other => panic!("expected solid fill, got {:?}", other),
        }
    }

    #[test]
    fn test_line_styles_are_counted() {
        let bytes = build::define_shape_with_line_style(2, 400);
        let def = parse_single(&bytes);
        assert_eq!(def.line_style_count, 1);
    }

    #[test]
    fn test_curve_edges_are_marked() {
        let bytes = build::define_shape_with_curve(9);
        let def = parse_single(&bytes);
        assert!(def
            .edges
            .iter()
            .any(|e| matches!(e, ShapeEdge::Curve { .. })));
    }
}
