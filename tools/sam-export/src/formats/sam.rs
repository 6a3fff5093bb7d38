//! SAM binary serialization
//!
//! Layout: header ("MAS." signature, version, frame-rate byte, scaled
//! bounding box, v2 name string), shape table, frame table. All integers
//! little-endian.
//!
//! The frame table applies two transformations on top of the parsed model:
//!
//! - **Depth remapping**: one source add may place a group of shapes
//!   (a `ShapeRef`), so each logical depth maps to a contiguous block of
//!   physical depths: `(depth - firstDepth) * depthMultiplier`, where the
//!   multiplier is the largest group size in the animation. Removes and
//!   moves expand through a logical-depth → block-size map maintained
//!   across frames.
//! - **Delta compression**: each move record only carries the matrix,
//!   coordinate and color fields that changed against the last emitted
//!   state at its physical depth (or the defaults right after an add).

use hashbrown::HashMap;
use std::path::Path;

use swf_tag::{FIXED_ONE, PF_CHAR, PF_CXFORM, PF_MATRIX, TWIPS_PER_PIXEL};

use crate::error::ConvertError;
use crate::model::{Frame, Movie, ObjectAdd, ObjectMove, Shape};
use crate::version::SamVersion;

pub const SAM_SIGNATURE: &[u8; 4] = b"MAS.";

pub const FRAMEFLAGS_REMOVES: u8 = 0x01;
pub const FRAMEFLAGS_ADDS: u8 = 0x02;
pub const FRAMEFLAGS_MOVES: u8 = 0x04;
pub const FRAMEFLAGS_LABEL: u8 = 0x08;

pub const SYMBOLFLAGS_BITMAP: u8 = 0x01;
pub const SYMBOLFLAGS_COLOR: u8 = 0x02;
pub const SYMBOLFLAGS_MATRIX: u8 = 0x04;
pub const SYMBOLFLAGS_SIZE: u8 = 0x08;

pub const MOVEFLAGS_LONGCOORDS: u16 = 0x0800;
pub const MOVEFLAGS_MATRIX: u16 = 0x1000;
pub const MOVEFLAGS_COLOR: u16 = 0x2000;

pub const MOVEFLAGSV2_TRANSFORM: u16 = 0x1000;
pub const MOVEFLAGSV2_COORDS: u16 = 0x2000;
pub const MOVEFLAGSV2_MULTCOLOR: u16 = 0x4000;
pub const MOVEFLAGSV2_ADDCOLOR: u16 = 0x8000;

fn scale_floor(value: i32, scale: f64) -> i32 {
    (f64::from(value) * scale).floor() as i32
}

fn scale_ceil(value: i32, scale: f64) -> i32 {
    (f64::from(value) * scale).ceil() as i32
}

/// Serializes one [`Movie`] into SAM bytes
pub struct SamWriter<'a> {
    movie: &'a Movie,
    version: SamVersion,
    scale: f64,
    file_name: String,
    buf: Vec<u8>,
    /// logical depth -> physical block size, updated on every add
    blocks: HashMap<u16, u16>,
    /// physical depth -> last emitted move state
    move_state: HashMap<u16, ObjectMove>,
}

impl<'a> SamWriter<'a> {
    pub fn new(movie: &'a Movie, version: SamVersion, scale: f64, file_name: String) -> Self {
        Self {
            movie,
            version,
            scale,
            file_name,
            buf: Vec::new(),
            blocks: HashMap::new(),
            move_state: HashMap::new(),
        }
    }

    pub fn write(mut self) -> Result<Vec<u8>, ConvertError> {
        self.write_header()?;
        self.write_shapes()?;
        self.write_frames()?;
        Ok(self.buf)
    }

    // -- byte sinks ----------------------------------------------------------

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_str(&mut self, s: &str) -> Result<(), ConvertError> {
        if s.len() > 0xFFFF {
            return Err(ConvertError::OutputFileWrite(self.file_name.clone()));
        }
        self.put_u16(s.len() as u16);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn put_section_len(&mut self, len: usize) -> Result<(), ConvertError> {
        let max = self.version.max_display_count();
        if len > max {
            return Err(ConvertError::UnsupportedDisplayCount(max as u32));
        }
        match self.version {
            SamVersion::V1 => self.put_u8(len as u8),
            SamVersion::V2 => self.put_u16(len as u16),
        }
        Ok(())
    }

    // -- header and shape table ----------------------------------------------

    fn write_header(&mut self) -> Result<(), ConvertError> {
        let size = &self.movie.movie_size;
        let x = scale_floor(size.x_min, self.scale);
        let y = scale_floor(size.y_min, self.scale);
        let width = scale_ceil(size.x_max, self.scale) - x;
        let height = scale_ceil(size.y_max, self.scale) - y;

        self.buf.extend_from_slice(SAM_SIGNATURE);
        self.put_u32(self.version as u32);
        self.put_u8((self.movie.frame_rate >> 8) as u8);
        self.put_i32(x);
        self.put_i32(y);
        self.put_i32(width);
        self.put_i32(height);
        if self.version == SamVersion::V2 {
            let movie = self.movie;
            self.put_str(&movie.name)?;
        }
        Ok(())
    }

    fn write_shapes(&mut self) -> Result<(), ConvertError> {
        self.put_u16(self.movie.shapes.len() as u16);
        match self.version {
            SamVersion::V1 => self.write_shapes_v1(),
            SamVersion::V2 => self.write_shapes_v2(),
        }
    }

    fn write_shapes_v1(&mut self) -> Result<(), ConvertError> {
        let movie = self.movie;
        for shape in &movie.shapes {
            let image = self.backing_image(shape)?;

            let scaled_x = scale_ceil(shape.matrix.tx, self.scale);
            let scaled_y = scale_ceil(shape.matrix.ty, self.scale);
            if !(-32768..=32767).contains(&scaled_x) || !(-32768..=32767).contains(&scaled_y) {
                return Err(ConvertError::BadScaleValue);
            }

            self.put_str(&image.file_name)?;
            self.put_u16(image.width);
            self.put_u16(image.height);
            self.put_i32(shape.matrix.sx);
            self.put_i32(shape.matrix.r1);
            self.put_i32(shape.matrix.r0);
            self.put_i32(shape.matrix.sy);
            self.put_i16(scaled_x as i16);
            self.put_i16(scaled_y as i16);
        }
        Ok(())
    }

    fn write_shapes_v2(&mut self) -> Result<(), ConvertError> {
        let movie = self.movie;
        for shape in &movie.shapes {
            let mut flags = SYMBOLFLAGS_SIZE;

            let (scaled_width, scaled_height) = match shape.image_index {
                Some(_) => {
                    flags |= SYMBOLFLAGS_BITMAP;
                    let image = self.backing_image(shape)?;
                    (i64::from(image.width), i64::from(image.height))
                }
                None => {
                    let w = (f64::from(shape.width) / f64::from(TWIPS_PER_PIXEL) * self.scale)
                        .ceil() as i64;
                    let h = (f64::from(shape.height) / f64::from(TWIPS_PER_PIXEL) * self.scale)
                        .ceil() as i64;
                    (w, h)
                }
            };
            if !(0..=0xFFFF).contains(&scaled_width) || !(0..=0xFFFF).contains(&scaled_height) {
                return Err(ConvertError::BadScaleValue);
            }

            if shape.color.a > 0 {
                flags |= SYMBOLFLAGS_COLOR;
            }

            let default = Shape::default();
            if shape.matrix != default.matrix {
                flags |= SYMBOLFLAGS_MATRIX;
            }

            self.put_u8(flags);
            if flags & SYMBOLFLAGS_BITMAP != 0 {
                // checked above via backing_image
                self.put_u16(shape.image_index.unwrap_or(0));
            }
            if flags & SYMBOLFLAGS_COLOR != 0 {
                self.put_rgba(shape.color);
            }
            self.put_u16(scaled_width as u16);
            self.put_u16(scaled_height as u16);
            if flags & SYMBOLFLAGS_MATRIX != 0 {
                let scaled_x = scale_ceil(shape.matrix.tx, self.scale);
                let scaled_y = scale_ceil(shape.matrix.ty, self.scale);
                self.put_i32(shape.matrix.sx / TWIPS_PER_PIXEL);
                self.put_i32(shape.matrix.r1);
                self.put_i32(shape.matrix.r0);
                self.put_i32(shape.matrix.sy / TWIPS_PER_PIXEL);
                self.put_i32(scaled_x);
                self.put_i32(scaled_y);
            }
        }
        Ok(())
    }

    fn backing_image(&self, shape: &Shape) -> Result<&'a crate::model::Image, ConvertError> {
        shape
            .image_index
            .and_then(|i| self.movie.images.get(usize::from(i)))
            .ok_or_else(|| ConvertError::InputFileBadData("shape without bitmap".into()))
    }

    fn put_rgba(&mut self, color: swf_tag::Rgba) {
        self.put_u8(color.r);
        self.put_u8(color.g);
        self.put_u8(color.b);
        self.put_u8(color.a);
    }

    // -- depth remapping -----------------------------------------------------

    /// Physical depth of a logical depth's block start
    fn physical_depth(&self, depth: u16) -> Result<u16, ConvertError> {
        let first = self.movie.first_depth.unwrap_or(depth);
        if depth < first {
            return Err(ConvertError::UnsupportedObjectDepth(u32::from(depth)));
        }
        let phys = u32::from(depth - first) * u32::from(self.movie.depth_multiplier);
        if phys > self.version.max_depth() {
            return Err(ConvertError::UnsupportedObjectDepth(u32::from(depth)));
        }
        Ok(phys as u16)
    }

    /// Physical depths currently mapped for a logical depth
    fn physical_block(&self, depth: u16) -> Result<(u16, u16), ConvertError> {
        let base = self.physical_depth(depth)?;
        let count = self.blocks.get(&depth).copied().unwrap_or(1);
        if count > 0 && u32::from(base) + u32::from(count) - 1 > self.version.max_depth() {
            return Err(ConvertError::UnsupportedObjectDepth(u32::from(depth)));
        }
        Ok((base, count))
    }

    // -- frame table ---------------------------------------------------------

    fn write_frames(&mut self) -> Result<(), ConvertError> {
        self.put_u16(self.movie.frames.len() as u16);
        let movie = self.movie;
        for frame in &movie.frames {
            self.write_frame(frame)?;
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), ConvertError> {
        // a removed depth keeps its move state only when a place-with-
        // character re-adds it in the same frame
        for &remove in &frame.removes {
            let readded = frame
                .moves
                .iter()
                .any(|m| m.depth == remove && m.flags & PF_CHAR != 0);
            if !readded {
                let (base, count) = self.physical_block(remove)?;
                for phys in base..base + count {
                    self.move_state.remove(&phys);
                }
            }
        }

        let mut removes = Vec::new();
        for &remove in &frame.removes {
            let (base, count) = self.physical_block(remove)?;
            removes.extend(base..base + count);
        }

        let mut adds = Vec::new();
        for add in &frame.adds {
            self.expand_add(add, &mut adds)?;
        }

        let mut moves = Vec::new();
        for mv in &frame.moves {
            let (base, count) = self.physical_block(mv.depth)?;
            for i in 0..count {
                moves.push(ObjectMove {
                    depth: base + i,
                    ..*mv
                });
            }
        }

        let mut flags = 0u8;
        if !removes.is_empty() {
            flags |= FRAMEFLAGS_REMOVES;
        }
        if !adds.is_empty() {
            flags |= FRAMEFLAGS_ADDS;
        }
        if !moves.is_empty() {
            flags |= FRAMEFLAGS_MOVES;
        }
        if frame.label.is_some() {
            flags |= FRAMEFLAGS_LABEL;
        }
        self.put_u8(flags);

        if !removes.is_empty() {
            self.put_section_len(removes.len())?;
            for depth in removes {
                self.put_u16(depth);
            }
        }

        if !adds.is_empty() {
            self.put_section_len(adds.len())?;
            for (depth, shape_id) in adds {
                self.put_u16(depth);
                match self.version {
                    SamVersion::V1 => self.put_u8(shape_id as u8),
                    SamVersion::V2 => self.put_u16(shape_id),
                }
            }
        }

        if !moves.is_empty() {
            self.put_section_len(moves.len())?;
            for mv in moves {
                let prev = self.move_state.get(&mv.depth).copied().unwrap_or_default();
                let resolved = match self.version {
                    SamVersion::V1 => self.write_move_v1(mv, &prev)?,
                    SamVersion::V2 => self.write_move_v2(mv, &prev)?,
                };
                self.move_state.insert(resolved.depth, resolved);
            }
        }

        if let Some(label) = &frame.label {
            self.put_str(label)?;
        }

        Ok(())
    }

    /// Expand one logical add into its shape group's block, updating the
    /// block map
    fn expand_add(
        &mut self,
        add: &ObjectAdd,
        out: &mut Vec<(u16, u16)>,
    ) -> Result<(), ConvertError> {
        if add.shapes.is_empty() {
            // the definition was skipped in permissive mode
            self.blocks.insert(add.depth, 0);
            return Ok(());
        }
        let base = self.physical_depth(add.depth)?;
        let end = u32::from(base) + u32::from(add.shapes.count) - 1;
        if end > self.version.max_depth() {
            return Err(ConvertError::UnsupportedObjectDepth(u32::from(add.depth)));
        }
        for i in 0..add.shapes.count {
            out.push((base + i, add.shapes.first + i));
        }
        self.blocks.insert(add.depth, add.shapes.count);
        Ok(())
    }

    // -- move records --------------------------------------------------------

    /// Write a v1 move, returning the fully resolved state for the depth map
    fn write_move_v1(
        &mut self,
        mut mv: ObjectMove,
        prev: &ObjectMove,
    ) -> Result<ObjectMove, ConvertError> {
        let mut depth_and_flags = mv.depth & self.version.depth_mask();

        if mv.flags & PF_MATRIX == 0 {
            mv.matrix = prev.matrix;
        }
        if mv.flags & PF_CXFORM == 0 {
            mv.mult_color = prev.mult_color;
            mv.add_color = prev.add_color;
        }

        if mv.matrix.sx != FIXED_ONE
            || mv.matrix.sy != FIXED_ONE
            || mv.matrix.r0 != 0
            || mv.matrix.r1 != 0
        {
            depth_and_flags |= MOVEFLAGS_MATRIX;
        }

        let scaled_x = scale_ceil(mv.matrix.tx, self.scale);
        let scaled_y = scale_ceil(mv.matrix.ty, self.scale);
        if !(-32768..=32767).contains(&scaled_x) || !(-32768..=32767).contains(&scaled_y) {
            depth_and_flags |= MOVEFLAGS_LONGCOORDS;
        }

        // a freshly added object compares against the neutral color
        let base_color = if mv.flags & PF_CHAR == 0 {
            prev.mult_color
        } else {
            ObjectMove::default().mult_color
        };
        if mv.flags & (PF_CXFORM | PF_CHAR) != 0 && mv.mult_color != base_color {
            depth_and_flags |= MOVEFLAGS_COLOR;
        }

        self.put_u16(depth_and_flags);

        if depth_and_flags & MOVEFLAGS_MATRIX != 0 {
            self.put_i32(mv.matrix.sx);
            self.put_i32(mv.matrix.r1);
            self.put_i32(mv.matrix.r0);
            self.put_i32(mv.matrix.sy);
        }

        if depth_and_flags & MOVEFLAGS_LONGCOORDS != 0 {
            self.put_i32(scaled_x);
            self.put_i32(scaled_y);
        } else {
            self.put_i16(scaled_x as i16);
            self.put_i16(scaled_y as i16);
        }

        if depth_and_flags & MOVEFLAGS_COLOR != 0 {
            self.put_rgba(mv.mult_color);
        }

        Ok(mv)
    }

    /// Write a v2 move, returning the fully resolved state for the depth map
    fn write_move_v2(
        &mut self,
        mut mv: ObjectMove,
        prev: &ObjectMove,
    ) -> Result<ObjectMove, ConvertError> {
        let mut depth_and_flags = mv.depth & self.version.depth_mask();

        if mv.flags & PF_MATRIX == 0 {
            mv.matrix = prev.matrix;
        }
        if mv.flags & PF_CXFORM == 0 {
            mv.mult_color = prev.mult_color;
            mv.add_color = prev.add_color;
        }

        // a freshly added object compares against the default state
        let base = if mv.flags & PF_CHAR == 0 {
            *prev
        } else {
            ObjectMove::default()
        };

        let mut scaled_x = 0;
        let mut scaled_y = 0;

        if mv.flags & (PF_MATRIX | PF_CHAR) != 0 {
            if mv.matrix.sx != base.matrix.sx
                || mv.matrix.sy != base.matrix.sy
                || mv.matrix.r0 != base.matrix.r0
                || mv.matrix.r1 != base.matrix.r1
            {
                depth_and_flags |= MOVEFLAGSV2_TRANSFORM;
            }
            if mv.matrix.tx != base.matrix.tx || mv.matrix.ty != base.matrix.ty {
                scaled_x = scale_ceil(mv.matrix.tx, self.scale);
                scaled_y = scale_ceil(mv.matrix.ty, self.scale);
                depth_and_flags |= MOVEFLAGSV2_COORDS;
            }
        }

        if mv.flags & (PF_CXFORM | PF_CHAR) != 0 {
            if mv.mult_color != base.mult_color {
                depth_and_flags |= MOVEFLAGSV2_MULTCOLOR;
            }
            if mv.add_color != base.add_color {
                depth_and_flags |= MOVEFLAGSV2_ADDCOLOR;
            }
        }

        self.put_u16(depth_and_flags);

        if depth_and_flags & MOVEFLAGSV2_TRANSFORM != 0 {
            self.put_i32(mv.matrix.sx);
            self.put_i32(mv.matrix.r1);
            self.put_i32(mv.matrix.r0);
            self.put_i32(mv.matrix.sy);
        }
        if depth_and_flags & MOVEFLAGSV2_COORDS != 0 {
            self.put_i32(scaled_x);
            self.put_i32(scaled_y);
        }
        if depth_and_flags & MOVEFLAGSV2_MULTCOLOR != 0 {
            self.put_rgba(mv.mult_color);
        }
        if depth_and_flags & MOVEFLAGSV2_ADDCOLOR != 0 {
            self.put_rgba(mv.add_color);
        }

        Ok(mv)
    }
}

/// Serialize `movie` and atomically commit it as `{prefix}.sam`, returning
/// the written file's name
pub fn export_sam(
    movie: &Movie,
    version: SamVersion,
    scale: f64,
    prefix: &str,
) -> Result<String, ConvertError> {
    let sam_path = format!("{prefix}.sam");
    let file_name = Path::new(&sam_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| sam_path.clone());

    let bytes = SamWriter::new(movie, version, scale, file_name.clone()).write()?;

    if let Some(parent) = Path::new(&sam_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|_| ConvertError::OutputDir)?;
        }
    }
    let tmp_path = format!("{sam_path}.tmp");
    std::fs::write(&tmp_path, &bytes)
        .and_then(|()| std::fs::rename(&tmp_path, &sam_path))
        .map_err(|_| ConvertError::OutputFileWrite(file_name.clone()))?;

    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Image, ObjectAdd, ShapeRef};
    use swf_tag::{Matrix, Rect, Rgba};

    fn test_image() -> Image {
        Image {
            index: 0,
            width: 8,
            height: 8,
            file_name: "m_0001.png".into(),
        }
    }

    fn bitmap_shape() -> Shape {
        Shape {
            image_index: Some(0),
            width: 160,
            height: 160,
            ..Shape::default()
        }
    }

    fn movie(shapes: Vec<Shape>, frames: Vec<Frame>, first_depth: u16, multiplier: u16) -> Movie {
        Movie {
            movie_size: Rect {
                x_min: 0,
                x_max: 160,
                y_min: 0,
                y_max: 160,
            },
            frame_rate: 0x0C00,
            name: "m".into(),
            images: vec![test_image()],
            shapes,
            frames,
            first_depth: Some(first_depth),
            depth_multiplier: multiplier,
        }
    }

    fn write(movie: &Movie, version: SamVersion) -> Vec<u8> {
        SamWriter::new(movie, version, 1.0, "m.sam".into())
            .write()
            .unwrap()
    }

    #[test]
    fn test_v2_group_add_expands_and_moves_delta_compress() {
        let color_member = Shape {
            width: 160,
            height: 160,
            color: Rgba {
                r: 1,
                g: 2,
                b: 3,
                a: 255,
            },
            ..Shape::default()
        };
        let moved = Matrix {
            tx: 200,
            ty: 400,
            ..Matrix::default()
        };
        let frames = vec![
            Frame {
                adds: vec![ObjectAdd {
                    depth: 5,
                    shapes: ShapeRef { first: 0, count: 2 },
                }],
                ..Frame::default()
            },
            Frame {
                moves: vec![ObjectMove {
                    depth: 5,
                    flags: PF_MATRIX,
                    matrix: moved,
                    ..ObjectMove::default()
                }],
                ..Frame::default()
            },
            // identical move again: fully absorbed by the depth state
            Frame {
                moves: vec![ObjectMove {
                    depth: 5,
                    flags: PF_MATRIX,
                    matrix: moved,
                    ..ObjectMove::default()
                }],
                ..Frame::default()
            },
        ];
        let movie = movie(vec![color_member, bitmap_shape()], frames, 5, 2);
        let bytes = write(&movie, SamVersion::V2);

        let mut tail = Vec::new();
        tail.extend_from_slice(&3u16.to_le_bytes());
        // frame 0: the group add covers physical depths 0 and 1
        tail.push(FRAMEFLAGS_ADDS);
        tail.extend_from_slice(&2u16.to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
        tail.extend_from_slice(&1u16.to_le_bytes());
        tail.extend_from_slice(&1u16.to_le_bytes());
        // frame 1: one logical move expands to both depths, coords only
        tail.push(FRAMEFLAGS_MOVES);
        tail.extend_from_slice(&2u16.to_le_bytes());
        for depth in [0u16, 1] {
            tail.extend_from_slice(&(depth | MOVEFLAGSV2_COORDS).to_le_bytes());
            tail.extend_from_slice(&200i32.to_le_bytes());
            tail.extend_from_slice(&400i32.to_le_bytes());
        }
        // frame 2: nothing changed, bare depth words
        tail.push(FRAMEFLAGS_MOVES);
        tail.extend_from_slice(&2u16.to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
        tail.extend_from_slice(&1u16.to_le_bytes());

        assert_eq!(&bytes[bytes.len() - tail.len()..], tail.as_slice());
    }

    #[test]
    fn test_v1_long_coords_promotion() {
        let frames = vec![
            Frame {
                adds: vec![ObjectAdd {
                    depth: 1,
                    shapes: ShapeRef { first: 0, count: 1 },
                }],
                ..Frame::default()
            },
            Frame {
                moves: vec![ObjectMove {
                    depth: 1,
                    flags: PF_MATRIX,
                    matrix: Matrix {
                        tx: 40000,
                        ty: 0,
                        ..Matrix::default()
                    },
                    ..ObjectMove::default()
                }],
                ..Frame::default()
            },
        ];
        let movie = movie(vec![bitmap_shape()], frames, 1, 1);
        let bytes = write(&movie, SamVersion::V1);

        let mut tail = Vec::new();
        tail.push(FRAMEFLAGS_MOVES);
        tail.push(1);
        // 40000 does not fit an i16, so the record carries the long flag
        tail.extend_from_slice(&MOVEFLAGS_LONGCOORDS.to_le_bytes());
        tail.extend_from_slice(&40000i32.to_le_bytes());
        tail.extend_from_slice(&0i32.to_le_bytes());

        assert_eq!(&bytes[bytes.len() - tail.len()..], tail.as_slice());
    }

    #[test]
    fn test_remove_clears_state_unless_readded() {
        let place = |flags: u16| ObjectMove {
            depth: 1,
            flags,
            matrix: Matrix {
                tx: 100,
                ty: 0,
                ..Matrix::default()
            },
            ..ObjectMove::default()
        };
        let add = ObjectAdd {
            depth: 1,
            shapes: ShapeRef { first: 0, count: 1 },
        };
        let frames = vec![
            Frame {
                adds: vec![add],
                moves: vec![place(PF_CHAR | PF_MATRIX)],
                ..Frame::default()
            },
            // plain remove drops the depth state
            Frame {
                removes: vec![1],
                ..Frame::default()
            },
            Frame {
                adds: vec![add],
                moves: vec![place(PF_CHAR | PF_MATRIX)],
                ..Frame::default()
            },
        ];
        let movie = movie(vec![bitmap_shape()], frames, 1, 1);
        let bytes = write(&movie, SamVersion::V2);

        // both placements emit the same full record against default state
        let mut record = Vec::new();
        record.extend_from_slice(&MOVEFLAGSV2_COORDS.to_le_bytes());
        record.extend_from_slice(&100i32.to_le_bytes());
        record.extend_from_slice(&0i32.to_le_bytes());
        let hits = bytes
            .windows(record.len())
            .filter(|w| *w == record.as_slice())
            .count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_header_bbox_scaled() {
        let movie = movie(vec![bitmap_shape()], vec![Frame::default()], 1, 1);
        let bytes = write(&movie, SamVersion::V2);

        assert_eq!(&bytes[0..4], SAM_SIGNATURE);
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(bytes[8], 0x0C);
        let bytes15 = SamWriter::new(&movie, SamVersion::V2, 1.5, "m.sam".into())
            .write()
            .unwrap();
        // width 160 * 1.5 = 240, min stays at 0
        assert_eq!(&bytes15[9..13], &0i32.to_le_bytes());
        assert_eq!(&bytes15[17..21], &240i32.to_le_bytes());
    }
}
