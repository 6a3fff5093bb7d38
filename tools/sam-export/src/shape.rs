//! Shape extraction: classifies a source shape definition's fills and
//! verifies its outline traces exactly one axis-aligned rectangle
//!
//! A convertible definition yields one or two [`Shape`] records (SAM v2
//! splits a combined bitmap+solid definition into a color shape under a
//! bitmap shape) that callers group as one [`ShapeRef`].

use hashbrown::HashMap;

use swf_tag::{FillKind, Matrix, Rgba, ShapeDef, ShapeEdge};

use crate::error::ConvertError;
use crate::model::Shape;
use crate::version::SamVersion;

/// Bitmap character id meaning "no bitmap"
const NO_BITMAP_ID: u16 = 0xFFFF;

/// Running extent of the traced outline
#[derive(Debug, Clone, Copy, Default)]
struct Trace {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Trace {
    fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn reset(&mut self, x: i32, y: i32) {
        self.min_x = x;
        self.max_x = x;
        self.min_y = y;
        self.max_y = y;
    }
}

/// Walk the outline accepting a 4- or 5-point closed rectangle
///
/// A path starting with a line edge is anchored at an implicit origin and
/// closes after 3 edges; one starting with a move closes after 4 edges back
/// onto the move target. In permissive mode mid-path moves are skipped, and
/// a multi-fill shape may carry trailing edges past the rectangle.
fn validate_rect(edges: &[ShapeEdge], permissive: bool, multi_fill: bool) -> (Trace, bool) {
    let mut trace = Trace::default();
    let move_zero = matches!(edges.first(), Some(ShapeEdge::LineTo { .. }));
    let test_count = if move_zero { 3 } else { 4 };
    let mut count = 0usize;
    let mut ok = true;

    let mut i = 0;
    while i < edges.len() && ok {
        let last = i + 1 == edges.len();
        match edges[i] {
            ShapeEdge::LineTo { x, y } => {
                if last || count == test_count {
                    let closed = count == test_count
                        && (move_zero || (x, y) == edges[0].point());
                    if !closed {
                        ok = false;
                    }
                } else {
                    trace.include(x, y);
                }
            }
            ShapeEdge::MoveTo { x, y } => {
                if i == 0 {
                    trace.reset(x, y);
                } else if !permissive {
                    ok = false;
                }
            }
            ShapeEdge::Curve { .. } => ok = false,
        }

        if ok && count == test_count && permissive && !last {
            if multi_fill {
                // extra geometry belongs to the already-warned extra fills
                break;
            }
            ok = false;
        }

        if ok {
            count += 1;
            i += 1;
        } else {
            break;
        }
    }

    (trace, ok)
}

/// The oldest-generation walk: on top of the rectangle closure rules, every
/// edge must be strictly horizontal or vertical, alternating axis, and the
/// path must start at the bitmap fill's translation
fn validate_rect_v1(edges: &[ShapeEdge], anchor: (i32, i32)) -> (Trace, bool) {
    let mut trace = Trace::default();

    let (start, lines) = match edges.first() {
        Some(&ShapeEdge::MoveTo { x, y }) => ((x, y), &edges[1..]),
        Some(ShapeEdge::LineTo { .. }) => ((0, 0), edges),
        _ => return (trace, false),
    };
    trace.reset(start.0, start.1);

    if start != anchor || lines.len() != 4 {
        return (trace, false);
    }

    let mut prev = start;
    let mut prev_horizontal = None;
    for line in lines {
        let (x, y) = match *line {
            ShapeEdge::LineTo { x, y } => (x, y),
            _ => return (trace, false),
        };
        let horizontal = match (x != prev.0, y != prev.1) {
            (true, false) => true,
            (false, true) => false,
            _ => return (trace, false),
        };
        if prev_horizontal == Some(horizontal) {
            return (trace, false);
        }
        trace.include(x, y);
        prev = (x, y);
        prev_horizontal = Some(horizontal);
    }

    (trace, prev == start)
}

/// Classified fills of one definition
struct Fills {
    image_index: Option<usize>,
    matrix: Matrix,
    color: Option<Rgba>,
    /// Extra same-kind fills were warned away in permissive mode
    multi_fill: bool,
}

pub struct ShapeExtractor<'a> {
    pub image_map: &'a HashMap<u16, usize>,
    pub version: SamVersion,
    pub permissive: bool,
}

impl ShapeExtractor<'_> {
    /// Convert one definition into its SAM shape group.
    ///
    /// `Ok(vec![])` means the definition was skipped in permissive mode;
    /// skippable warnings are appended to `warnings`.
    pub fn extract(
        &self,
        def: &ShapeDef,
        warnings: &mut Vec<ConvertError>,
    ) -> Result<Vec<Shape>, ConvertError> {
        if def.line_style_count > 0 {
            self.reject(
                ConvertError::UnsupportedLineStyles { shape_id: def.id },
                warnings,
            )?;
        }

        let fills = self.classify_fills(def, warnings)?;

        let Some(image_index) = fills.image_index else {
            let err = ConvertError::UnsupportedNobitmapShape { shape_id: def.id };
            self.reject(err, warnings)?;
            return Ok(Vec::new());
        };

        let (trace, rect_ok) = match self.version {
            SamVersion::V1 => validate_rect_v1(&def.edges, (fills.matrix.tx, fills.matrix.ty)),
            SamVersion::V2 => validate_rect(&def.edges, self.permissive, fills.multi_fill),
        };
        if !rect_ok {
            self.reject(
                ConvertError::UnsupportedVectorShape { shape_id: def.id },
                warnings,
            )?;
        }

        let mut width = def.bounds.width();
        let mut height = def.bounds.height();
        if width == 0 && height == 0 {
            width = trace.max_x - trace.min_x;
            height = trace.max_y - trace.min_y;
        }

        let mut group = Vec::new();
        if let Some(color) = fills.color {
            // color member sits under the bitmap member
            group.push(Shape {
                width,
                height,
                color,
                ..Shape::default()
            });
        }
        group.push(Shape {
            image_index: Some(image_index as u16),
            width,
            height,
            matrix: fills.matrix,
            ..Shape::default()
        });
        Ok(group)
    }

    fn classify_fills(
        &self,
        def: &ShapeDef,
        warnings: &mut Vec<ConvertError>,
    ) -> Result<Fills, ConvertError> {
        let mut fills = Fills {
            image_index: None,
            matrix: Matrix::default(),
            color: None,
            multi_fill: false,
        };

        for style in &def.fill_styles {
            match style.kind {
                FillKind::Solid(color) => {
                    if self.version == SamVersion::V1 {
                        // no color-only shape record in the v1 table
                        self.reject(
                            ConvertError::UnsupportedFillStyle {
                                type_byte: style.type_byte,
                                shape_id: def.id,
                            },
                            warnings,
                        )?;
                        continue;
                    }
                    if fills.color.replace(color).is_some() {
                        self.reject(
                            ConvertError::UnsupportedMulticolorShape { shape_id: def.id },
                            warnings,
                        )?;
                        fills.multi_fill = true;
                    }
                }
                FillKind::Bitmap { id, matrix } => {
                    if id == NO_BITMAP_ID {
                        continue;
                    }
                    let index = *self
                        .image_map
                        .get(&id)
                        .ok_or(ConvertError::UnknownImageId(id))?;
                    if fills.image_index.is_some() {
                        self.reject(
                            ConvertError::UnsupportedMultibitmapShape { shape_id: def.id },
                            warnings,
                        )?;
                        fills.multi_fill = true;
                        continue;
                    }
                    fills.image_index = Some(index);
                    fills.matrix = matrix;
                }
                FillKind::Other => {
                    self.reject(
                        ConvertError::UnsupportedFillStyle {
                            type_byte: style.type_byte,
                            shape_id: def.id,
                        },
                        warnings,
                    )?;
                }
            }
        }

        Ok(fills)
    }

    /// Fail hard, or record a warning in permissive mode
    fn reject(
        &self,
        err: ConvertError,
        warnings: &mut Vec<ConvertError>,
    ) -> Result<(), ConvertError> {
        if self.permissive && err.is_skippable() {
            warnings.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swf_tag::{build, Swf, Tag};

    fn decode(tag_bytes: Vec<u8>) -> ShapeDef {
        let swf = build::swf(6, 0x0c00, 1, build::rect_px(0, 0, 100, 100), &[tag_bytes]);
        let swf = Swf::parse(&swf).unwrap();
        let tag: Tag<'_> = swf.tags().next().unwrap().unwrap();
        swf_tag::decode_define_shape(&tag).unwrap()
    }

    fn extractor(image_map: &HashMap<u16, usize>, permissive: bool) -> ShapeExtractor<'_> {
        ShapeExtractor {
            image_map,
            version: SamVersion::V2,
            permissive,
        }
    }

    #[test]
    fn test_bitmap_rectangle_converts() {
        let mut image_map = HashMap::new();
        image_map.insert(3u16, 0usize);
        let matrix = Matrix {
            tx: 40,
            ty: 80,
            ..Matrix::default()
        };
        let def = decode(build::define_shape_bitmap_rect(22, 1, 3, &matrix, 0, 0, 640, 480));

        let mut warnings = Vec::new();
        let group = extractor(&image_map, false)
            .extract(&def, &mut warnings)
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].image_index, Some(0));
        assert_eq!(group[0].width, 640);
        assert_eq!(group[0].height, 480);
        assert_eq!(group[0].matrix.tx, 40);
    }

    #[test]
    fn test_unknown_image_is_always_fatal() {
        let image_map = HashMap::new();
        let def = decode(build::define_shape_bitmap_rect(
            22,
            1,
            9,
            &Matrix::default(),
            0,
            0,
            100,
            100,
        ));

        let mut warnings = Vec::new();
        let err = extractor(&image_map, true)
            .extract(&def, &mut warnings)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnknownImageId(9));
    }

    #[test]
    fn test_line_styles_rejected() {
        let image_map = HashMap::new();
        let def = decode(build::define_shape_with_line_style(1, 20));

        let mut warnings = Vec::new();
        let err = extractor(&image_map, false)
            .extract(&def, &mut warnings)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedLineStyles { shape_id: 1 });
    }

    #[test]
    fn test_solid_only_shape_is_nobitmap() {
        let image_map = HashMap::new();
        let color = Rgba {
            r: 9,
            g: 9,
            b: 9,
            a: 255,
        };
        let def = decode(build::define_shape_solid_rect(22, 4, color, 0, 0, 100, 100));

        let mut warnings = Vec::new();
        let err = extractor(&image_map, false)
            .extract(&def, &mut warnings)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedNobitmapShape { shape_id: 4 });

        // permissive mode skips the whole definition
        let mut warnings = Vec::new();
        let group = extractor(&image_map, true)
            .extract(&def, &mut warnings)
            .unwrap();
        assert!(group.is_empty());
        assert_eq!(
            warnings,
            vec![ConvertError::UnsupportedNobitmapShape { shape_id: 4 }]
        );
    }

    #[test]
    fn test_curved_outline_is_vector_shape() {
        let mut image_map = HashMap::new();
        image_map.insert(3u16, 0usize);
        // replace the solid fill with a bitmap so classification passes
        let def = {
            let mut def = decode(build::define_shape_with_curve(1));
            def.fill_styles[0] = swf_tag::FillStyle {
                type_byte: 0x41,
                kind: FillKind::Bitmap {
                    id: 3,
                    matrix: Matrix::default(),
                },
            };
            def
        };

        let mut warnings = Vec::new();
        let err = extractor(&image_map, false)
            .extract(&def, &mut warnings)
            .unwrap_err();
        assert_eq!(err, ConvertError::UnsupportedVectorShape { shape_id: 1 });
    }

    #[test]
    fn test_five_edges_not_closing_rejected() {
        // pentagon: five line edges that never close onto the start
        let edges = [
            ShapeEdge::MoveTo { x: 0, y: 0 },
            ShapeEdge::LineTo { x: 100, y: 0 },
            ShapeEdge::LineTo { x: 150, y: 80 },
            ShapeEdge::LineTo { x: 50, y: 140 },
            ShapeEdge::LineTo { x: -50, y: 80 },
            ShapeEdge::LineTo { x: -1, y: -1 },
        ];
        let (_, ok) = validate_rect(&edges, false, false);
        assert!(!ok);
        let (_, ok) = validate_rect(&edges, true, false);
        assert!(!ok);
    }

    #[test]
    fn test_closed_rectangle_walk() {
        let edges = [
            ShapeEdge::MoveTo { x: 10, y: 20 },
            ShapeEdge::LineTo { x: 110, y: 20 },
            ShapeEdge::LineTo { x: 110, y: 220 },
            ShapeEdge::LineTo { x: 10, y: 220 },
            ShapeEdge::LineTo { x: 10, y: 20 },
        ];
        let (trace, ok) = validate_rect(&edges, false, false);
        assert!(ok);
        assert_eq!(
            (trace.min_x, trace.min_y, trace.max_x, trace.max_y),
            (10, 20, 110, 220)
        );

        // 4-point form anchored at the implicit origin
        let edges = [
            ShapeEdge::LineTo { x: 100, y: 0 },
            ShapeEdge::LineTo { x: 100, y: 200 },
            ShapeEdge::LineTo { x: 0, y: 200 },
            ShapeEdge::LineTo { x: 0, y: 0 },
        ];
        let (_, ok) = validate_rect(&edges, false, false);
        assert!(ok);
    }

    #[test]
    fn test_v1_walk_requires_axis_aligned_anchored_edges() {
        let rect = |x0: i32, y0: i32| {
            [
                ShapeEdge::MoveTo { x: x0, y: y0 },
                ShapeEdge::LineTo { x: x0 + 100, y: y0 },
                ShapeEdge::LineTo { x: x0 + 100, y: y0 + 50 },
                ShapeEdge::LineTo { x: x0, y: y0 + 50 },
                ShapeEdge::LineTo { x: x0, y: y0 },
            ]
        };
        let (trace, ok) = validate_rect_v1(&rect(40, 60), (40, 60));
        assert!(ok);
        assert_eq!((trace.max_x, trace.max_y), (140, 110));

        // anchored somewhere else
        let (_, ok) = validate_rect_v1(&rect(40, 60), (0, 0));
        assert!(!ok);

        // diagonal edge
        let edges = [
            ShapeEdge::MoveTo { x: 0, y: 0 },
            ShapeEdge::LineTo { x: 100, y: 10 },
            ShapeEdge::LineTo { x: 100, y: 50 },
            ShapeEdge::LineTo { x: 0, y: 50 },
            ShapeEdge::LineTo { x: 0, y: 0 },
        ];
        let (_, ok) = validate_rect_v1(&edges, (0, 0));
        assert!(!ok);

        // two horizontal edges in a row
        let edges = [
            ShapeEdge::MoveTo { x: 0, y: 0 },
            ShapeEdge::LineTo { x: 50, y: 0 },
            ShapeEdge::LineTo { x: 100, y: 0 },
            ShapeEdge::LineTo { x: 100, y: 50 },
            ShapeEdge::LineTo { x: 0, y: 0 },
        ];
        let (_, ok) = validate_rect_v1(&edges, (0, 0));
        assert!(!ok);
    }

    #[test]
    fn test_v2_splits_bitmap_and_solid() {
        let mut image_map = HashMap::new();
        image_map.insert(3u16, 2usize);
        let color = Rgba {
            r: 10,
            g: 20,
            b: 30,
            a: 200,
        };
        let mut def = decode(build::define_shape_bitmap_rect(
            32,
            1,
            3,
            &Matrix::default(),
            0,
            0,
            200,
            100,
        ));
        def.fill_styles.push(swf_tag::FillStyle {
            type_byte: 0x00,
            kind: FillKind::Solid(color),
        });

        let mut warnings = Vec::new();
        let group = extractor(&image_map, false)
            .extract(&def, &mut warnings)
            .unwrap();
        assert_eq!(group.len(), 2);
        // color member first, bitmap above it
        assert_eq!(group[0].image_index, None);
        assert_eq!(group[0].color, color);
        assert_eq!(group[1].image_index, Some(2));
        assert_eq!(group[1].color.a, 0);
    }

    #[test]
    fn test_v1_rejects_solid_fill() {
        let mut image_map = HashMap::new();
        image_map.insert(3u16, 0usize);
        let mut def = decode(build::define_shape_bitmap_rect(
            2,
            1,
            3,
            &Matrix::default(),
            0,
            0,
            200,
            100,
        ));
        def.fill_styles.push(swf_tag::FillStyle {
            type_byte: 0x00,
            kind: FillKind::Solid(Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 255,
            }),
        });

        let mut warnings = Vec::new();
        let err = ShapeExtractor {
            image_map: &image_map,
            version: SamVersion::V1,
            permissive: false,
        }
        .extract(&def, &mut warnings)
        .unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnsupportedFillStyle {
                type_byte: 0x00,
                shape_id: 1
            }
        );
    }
}
