//! In-memory animation model built by the tag walk and consumed by the
//! SAM serializer

use swf_tag::{Matrix, Rect, Rgba, FIXED_ONE, TWIPS_PER_PIXEL};

/// Fixed-point scale value mapping one bitmap pixel onto one output pixel
/// (SWF bitmap fill matrices scale pixels into twip space)
pub const FIXED_TWIPS: i32 = FIXED_ONE * TWIPS_PER_PIXEL;

/// One extracted raster asset; the file is written at definition time
#[derive(Debug, Clone)]
pub struct Image {
    /// Insertion index; determines the output file name
    pub index: usize,
    /// Scaled pixel width
    pub width: u16,
    /// Scaled pixel height
    pub height: u16,
    pub file_name: String,
}

/// One renderable rectangle: a bitmap reference or a flat fill color
#[derive(Debug, Clone)]
pub struct Shape {
    pub image_index: Option<u16>,
    /// Footprint in twips
    pub width: i32,
    pub height: i32,
    /// Bitmap placement matrix (pixel-to-twip scale when default)
    pub matrix: Matrix,
    pub color: Rgba,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            image_index: None,
            width: 0,
            height: 0,
            matrix: Matrix {
                sx: FIXED_TWIPS,
                sy: FIXED_TWIPS,
                ..Matrix::default()
            },
            color: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
            },
        }
    }
}

/// Contiguous run of [`Shape`] records produced from one source shape
/// definition; the display list places the whole group in one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRef {
    pub first: u16,
    pub count: u16,
}

impl ShapeRef {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Add operation: place a shape group at a logical depth
#[derive(Debug, Clone, Copy)]
pub struct ObjectAdd {
    pub depth: u16,
    pub shapes: ShapeRef,
}

/// Transform+color delta tied to a logical depth
///
/// `flags` carries the place-object presence bits; the serializer compares
/// against the previously emitted state per physical depth and the default
/// state below to compute minimal wire flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMove {
    pub depth: u16,
    pub flags: u16,
    pub matrix: Matrix,
    pub mult_color: Rgba,
    pub add_color: Rgba,
}

impl Default for ObjectMove {
    fn default() -> Self {
        Self {
            depth: 0,
            flags: 0,
            matrix: Matrix::default(),
            mult_color: Rgba {
                r: 255,
                g: 255,
                b: 255,
                a: 255,
            },
            add_color: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
            },
        }
    }
}

/// One animation tick
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub removes: Vec<u16>,
    pub adds: Vec<ObjectAdd>,
    pub moves: Vec<ObjectMove>,
    pub label: Option<String>,
}

/// The fully parsed animation handed to the serializer
#[derive(Debug, Clone)]
pub struct Movie {
    pub movie_size: Rect,
    /// 8.8 fixed-point frames per second
    pub frame_rate: u16,
    pub name: String,
    pub images: Vec<Image>,
    pub shapes: Vec<Shape>,
    pub frames: Vec<Frame>,
    /// First logical depth any display-list operation touched
    pub first_depth: Option<u16>,
    /// Largest shape group size across the whole animation, min 1
    pub depth_multiplier: u16,
}

/// Clamp a 16-bit fixed-point color coefficient to [0, 256], convert to
/// 8-bit, fold in a negative additive term and apply an alpha factor
pub fn cx_to_byte(cx: i16, cadd: i16, alpha: f64) -> u8 {
    let cx = cx.clamp(0, 256);
    let mut result = (f64::from(cx) / 256.0) * 255.0;
    if cadd < 0 {
        result += f64::from(cadd);
    }
    if result <= 0.0 {
        return 0;
    }
    (result * alpha) as u8
}

/// Clamp an additive color term to the byte range
pub fn add_color_to_byte(cadd: i16) -> u8 {
    cadd.clamp(0, 255) as u8
}
