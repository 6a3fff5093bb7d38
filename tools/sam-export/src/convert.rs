//! The conversion session: one pass over the tag stream builds the
//! animation model, then the SAM serializer and the extracted images are
//! committed under the output prefix

use std::collections::BTreeMap;
use std::path::PathBuf;

use hashbrown::HashMap;
use tracing::{info, warn};

use swf_tag::{
    decode_define_shape, decode_frame_label, decode_place_object, decode_remove_object, Swf, Tag,
    TagCode, PF_CHAR, PF_CXFORM, PF_MATRIX, PF_MOVE, PF_NAME,
};

use crate::config::LabelRenames;
use crate::error::ConvertError;
use crate::formats::sam;
use crate::image::export_image;
use crate::model::{
    add_color_to_byte, cx_to_byte, Frame, Image, Movie, ObjectAdd, ObjectMove, Shape, ShapeRef,
};
use crate::shape::ShapeExtractor;
use crate::version::SamVersion;

/// Scale factors at or below this are rejected
const MIN_SCALE: f64 = 0.1;

/// Place-object flag bits with a SAM representation
const SUPPORTED_PLACE_FLAGS: u16 = PF_CHAR | PF_CXFORM | PF_MATRIX | PF_MOVE | PF_NAME;

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub scale: f64,
    pub sam_version: u32,
    pub config: Option<PathBuf>,
    pub skip_unsupported: bool,
}

/// Result of a successful conversion
#[derive(Debug)]
pub struct Summary {
    pub sam_file: String,
    /// old label -> written label, in encounter order
    pub labels: BTreeMap<String, String>,
}

/// Position in the frame array while walking the tag stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    At(usize),
    Done,
}

pub struct Session {
    options: Options,
    warnings: Vec<ConvertError>,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[ConvertError] {
        &self.warnings
    }

    pub fn run(&mut self) -> Result<Summary, ConvertError> {
        let version =
            SamVersion::from_u32(self.options.sam_version).ok_or(ConvertError::BadSamVersion)?;
        if self.options.scale <= MIN_SCALE {
            return Err(ConvertError::BadScaleValue);
        }

        let renames = match &self.options.config {
            Some(path) => LabelRenames::load(path)?,
            None => LabelRenames::default(),
        };

        let bytes = std::fs::read(&self.options.input).map_err(|_| ConvertError::InputFileOpen)?;
        let swf = Swf::parse(&bytes).map_err(|_| ConvertError::InputFileFormat)?;

        let stem = self
            .options
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".into());
        let prefix = self
            .options
            .output_dir
            .join(&stem)
            .to_string_lossy()
            .into_owned();

        let mut parser = Parser {
            version,
            file_version: swf.version,
            scale: self.options.scale,
            permissive: self.options.skip_unsupported,
            prefix: &prefix,
            renames: &renames,
            warnings: &mut self.warnings,
            images: Vec::new(),
            image_map: HashMap::new(),
            shapes: Vec::new(),
            shape_map: HashMap::new(),
            frames: vec![Frame::default(); usize::from(swf.frame_count)],
            cursor: if swf.frame_count > 0 {
                Cursor::At(0)
            } else {
                Cursor::Done
            },
            jpeg_tables: None,
            first_depth: None,
            labels: BTreeMap::new(),
        };

        for tag in swf.tags() {
            let tag = tag.map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;
            parser.handle_tag(&tag)?;
        }

        let depth_multiplier = parser
            .shape_map
            .values()
            .map(|r| r.count)
            .max()
            .unwrap_or(1)
            .max(1);

        let movie = Movie {
            movie_size: swf.movie_size,
            frame_rate: swf.frame_rate,
            name: stem,
            images: parser.images,
            shapes: parser.shapes,
            frames: parser.frames,
            first_depth: parser.first_depth,
            depth_multiplier,
        };
        let labels = parser.labels;

        let sam_file = sam::export_sam(&movie, version, self.options.scale, &prefix)?;

        info!("{sam_file}");
        info!("Labels:");
        for (old, new) in &labels {
            if old != new {
                info!("{old} -> {new}");
            } else {
                info!("{old}");
            }
        }

        Ok(Summary { sam_file, labels })
    }
}

struct Parser<'a> {
    version: SamVersion,
    file_version: u8,
    scale: f64,
    permissive: bool,
    prefix: &'a str,
    renames: &'a LabelRenames,
    warnings: &'a mut Vec<ConvertError>,
    images: Vec<Image>,
    image_map: HashMap<u16, usize>,
    shapes: Vec<Shape>,
    shape_map: HashMap<u16, ShapeRef>,
    frames: Vec<Frame>,
    cursor: Cursor,
    jpeg_tables: Option<Vec<u8>>,
    first_depth: Option<u16>,
    labels: BTreeMap<String, String>,
}

impl Parser<'_> {
    fn handle_tag(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        let Some(code) = TagCode::from_u16(tag.code) else {
            return Err(ConvertError::UnsupportedTag(tag.code));
        };

        match code {
            // administrative tags with no SAM counterpart
            TagCode::FileAttributes
            | TagCode::SetBackgroundColor
            | TagCode::SceneDescription
            | TagCode::Metadata
            | TagCode::DoAbc
            | TagCode::SymbolClass
            | TagCode::End => Ok(()),

            TagCode::ShowFrame => self.handle_show_frame(),
            TagCode::FrameLabel => self.handle_frame_label(tag),

            TagCode::PlaceObject | TagCode::PlaceObject2 | TagCode::PlaceObject3 => {
                self.handle_place_object(tag)
            }
            TagCode::RemoveObject | TagCode::RemoveObject2 => self.handle_remove_object(tag),

            TagCode::JpegTables => {
                self.jpeg_tables = Some(tag.body.to_vec());
                Ok(())
            }

            TagCode::DefineBitsJpeg
            | TagCode::DefineBitsJpeg2
            | TagCode::DefineBitsJpeg3
            | TagCode::DefineBitsLossless
            | TagCode::DefineBitsLossless2 => self.handle_image(tag),

            TagCode::DefineShape
            | TagCode::DefineShape2
            | TagCode::DefineShape3
            | TagCode::DefineShape4 => self.handle_shape(tag),
        }
    }

    fn current_frame(&mut self, what: &str) -> Result<&mut Frame, ConvertError> {
        match self.cursor {
            Cursor::At(index) => Ok(&mut self.frames[index]),
            Cursor::Done => Err(ConvertError::InputFileBadData(what.into())),
        }
    }

    fn handle_show_frame(&mut self) -> Result<(), ConvertError> {
        match self.cursor {
            Cursor::At(index) if index + 1 < self.frames.len() => {
                self.cursor = Cursor::At(index + 1);
                Ok(())
            }
            Cursor::At(_) => {
                self.cursor = Cursor::Done;
                Ok(())
            }
            Cursor::Done => Err(ConvertError::InputFileBadData("Show frame failed".into())),
        }
    }

    fn handle_frame_label(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        let label = decode_frame_label(tag, self.file_version)
            .map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;
        let written = self
            .renames
            .get(&label)
            .map(str::to_owned)
            .unwrap_or_else(|| label.clone());

        let frame = self.current_frame("Frame label failed")?;
        frame.label = Some(written.clone());
        self.labels.insert(label, written);
        Ok(())
    }

    /// Fail hard, or record a warning in permissive mode
    fn reject(&mut self, err: ConvertError) -> Result<(), ConvertError> {
        if self.permissive && err.is_skippable() {
            warn!("{err}");
            self.warnings.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }

    fn check_display_count(&self, len: usize) -> Result<(), ConvertError> {
        if len == self.version.max_display_count() {
            Err(ConvertError::UnsupportedDisplayCount(len as u32))
        } else {
            Ok(())
        }
    }

    fn handle_place_object(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        if self.cursor == Cursor::Done {
            return Err(ConvertError::InputFileBadData("Place object failed".into()));
        }

        let place = decode_place_object(tag)
            .map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;

        if place.flags & !SUPPORTED_PLACE_FLAGS != 0 {
            self.reject(ConvertError::UnsupportedObjectFlags(place.flags))?;
        }

        let depth = place.depth;
        if u32::from(depth) > self.version.max_depth() {
            return Err(ConvertError::UnsupportedObjectDepth(u32::from(depth)));
        }
        self.first_depth.get_or_insert(depth);

        let mut move_flags = 0u16;
        let should_move = place.legacy || place.flags & PF_MOVE != 0;

        if place.legacy || place.flags & PF_CHAR != 0 {
            let character_id = place.character_id.ok_or_else(|| {
                ConvertError::InputFileBadData("Place object failed".into())
            })?;
            let shapes = self
                .shape_map
                .get(&character_id)
                .copied()
                .ok_or(ConvertError::UnknownShapeId(character_id))?;

            if should_move {
                self.check_display_count(self.frame_removes_len())?;
                let frame = self.current_frame("Place object failed")?;
                frame.removes.push(depth);
                move_flags |= PF_CHAR;
            }

            self.check_display_count(self.frame_adds_len())?;
            let frame = self.current_frame("Place object failed")?;
            frame.adds.push(ObjectAdd { depth, shapes });
        }

        if place.legacy || place.flags & PF_CXFORM != 0 {
            move_flags |= PF_CXFORM;
        }
        if place.legacy || place.flags & PF_MATRIX != 0 {
            move_flags |= PF_MATRIX;
        }

        if move_flags != 0 {
            let matrix = place.matrix.unwrap_or_default();
            let cx = place.cxform.unwrap_or_default();

            // v1 folds the alpha coefficient into the color channels
            let alpha = match self.version {
                SamVersion::V1 => f64::from(cx.a_mult.clamp(0, 256)) / 256.0,
                SamVersion::V2 => 1.0,
            };

            let mult_color = swf_tag::Rgba {
                r: cx_to_byte(cx.r_mult, cx.r_add, alpha),
                g: cx_to_byte(cx.g_mult, cx.g_add, alpha),
                b: cx_to_byte(cx.b_mult, cx.b_add, alpha),
                a: cx_to_byte(cx.a_mult, cx.a_add, 1.0),
            };
            let add_color = swf_tag::Rgba {
                r: add_color_to_byte(cx.r_add),
                g: add_color_to_byte(cx.g_add),
                b: add_color_to_byte(cx.b_add),
                a: add_color_to_byte(cx.a_add),
            };

            // v1 move records cannot carry an additive term
            if self.version == SamVersion::V1
                && (add_color.r | add_color.g | add_color.b | add_color.a) != 0
            {
                return Err(ConvertError::UnsupportedAddColor);
            }

            self.check_display_count(self.frame_moves_len())?;
            let frame = self.current_frame("Place object failed")?;
            frame.moves.push(ObjectMove {
                depth,
                flags: move_flags,
                matrix,
                mult_color,
                add_color,
            });
        }

        Ok(())
    }

    fn frame_removes_len(&self) -> usize {
        match self.cursor {
            Cursor::At(index) => self.frames[index].removes.len(),
            Cursor::Done => 0,
        }
    }

    fn frame_adds_len(&self) -> usize {
        match self.cursor {
            Cursor::At(index) => self.frames[index].adds.len(),
            Cursor::Done => 0,
        }
    }

    fn frame_moves_len(&self) -> usize {
        match self.cursor {
            Cursor::At(index) => self.frames[index].moves.len(),
            Cursor::Done => 0,
        }
    }

    fn handle_remove_object(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        let depth = decode_remove_object(tag)
            .map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;
        self.first_depth.get_or_insert(depth);

        let max = self.version.max_display_count();
        let frame = self.current_frame("Remove object failed")?;
        if frame.removes.len() == max {
            return Err(ConvertError::UnsupportedDisplayCount(max as u32));
        }
        frame.removes.push(depth);
        Ok(())
    }

    fn handle_image(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        let character_id = tag
            .character_id()
            .map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;
        let index = self.images.len();
        let image = export_image(
            tag,
            self.jpeg_tables.as_deref(),
            index,
            self.prefix,
            self.scale,
        )?;
        self.images.push(image);
        self.image_map.insert(character_id, index);
        Ok(())
    }

    fn handle_shape(&mut self, tag: &Tag<'_>) -> Result<(), ConvertError> {
        let def = decode_define_shape(tag)
            .map_err(|e| ConvertError::InputFileBadData(e.to_string()))?;

        let extractor = ShapeExtractor {
            image_map: &self.image_map,
            version: self.version,
            permissive: self.permissive,
        };
        let group = extractor.extract(&def, self.warnings)?;

        let max = self.version.max_shape_count();
        if self.shapes.len() + group.len() > max {
            return Err(ConvertError::UnsupportedShapeCount(max as u32));
        }

        let shape_ref = ShapeRef {
            first: self.shapes.len() as u16,
            count: group.len() as u16,
        };
        self.shapes.extend(group);
        self.shape_map.insert(def.id, shape_ref);
        Ok(())
    }
}
