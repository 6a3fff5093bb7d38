//! Display-list tag payload decoders: place/remove object, frame labels
//!
//! The three PlaceObject wire variants are normalized into one record.
//! PlaceObject (the oldest) has no flag byte; its fields are always present
//! and it unconditionally carries replace/insert semantics, which is
//! surfaced through [`PlaceObject::legacy`].

use crate::error::SwfError;
use crate::reader::SwfReader;
use crate::tag::{Tag, TagCode};
use crate::types::{Cxform, Matrix};
use crate::UTF8_FILE_VERSION;

pub const PF_MOVE: u16 = 0x0001;
pub const PF_CHAR: u16 = 0x0002;
pub const PF_MATRIX: u16 = 0x0004;
pub const PF_CXFORM: u16 = 0x0008;
pub const PF_RATIO: u16 = 0x0010;
pub const PF_NAME: u16 = 0x0020;
pub const PF_CLIPDEPTH: u16 = 0x0040;
pub const PF_ACTIONEVENT: u16 = 0x0080;

/// Normalized place-object record
///
/// `flags` uses the `PF_*` bits; PlaceObject3's extended flag byte occupies
/// bits 8..16 so that any extended feature shows up as an unknown flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceObject {
    /// True for the flagless PlaceObject variant (always replace/insert)
    pub legacy: bool,
    pub flags: u16,
    pub depth: u16,
    pub character_id: Option<u16>,
    pub matrix: Option<Matrix>,
    pub cxform: Option<Cxform>,
    pub ratio: Option<u16>,
    pub name: Option<Vec<u8>>,
    pub clip_depth: Option<u16>,
}

/// Decode any of the three place-object tag variants
pub fn decode_place_object(tag: &Tag<'_>) -> Result<PlaceObject, SwfError> {
    let mut r = SwfReader::new(tag.body);
    match TagCode::from_u16(tag.code) {
        Some(TagCode::PlaceObject) => {
            let character_id = r.read_u16()?;
            let depth = r.read_u16()?;
            let matrix = Matrix::decode(&mut r)?;
            // A trailing CXFORM (no alpha channel) is optional
            let cxform = if r.remaining().is_empty() {
                None
            } else {
                Some(Cxform::decode(&mut r, false)?)
            };
            let mut flags = PF_MOVE | PF_CHAR | PF_MATRIX;
            if cxform.is_some() {
                flags |= PF_CXFORM;
            }
            Ok(PlaceObject {
                legacy: true,
                flags,
                depth,
                character_id: Some(character_id),
                matrix: Some(matrix),
                cxform,
                ..Default::default()
            })
        }
        Some(TagCode::PlaceObject2) => {
            let flags = u16::from(r.read_u8()?);
            let depth = r.read_u16()?;
            decode_place_fields_after_depth(&mut r, flags, depth)
        }
        Some(TagCode::PlaceObject3) => {
            let flags1 = u16::from(r.read_u8()?);
            let flags2 = u16::from(r.read_u8()?);
            let flags = flags1 | (flags2 << 8);
            let has_class_name =
                (flags2 & 0x08) != 0 || ((flags2 & 0x10) != 0 && (flags1 & PF_CHAR) != 0);
            decode_place_fields_po3(&mut r, flags, has_class_name)
        }
        _ => Err(SwfError::BadTagData("not a place-object tag")),
    }
}

fn decode_place_fields_po3(
    r: &mut SwfReader<'_>,
    flags: u16,
    has_class_name: bool,
) -> Result<PlaceObject, SwfError> {
    let depth = r.read_u16()?;
    if has_class_name {
        r.read_cstr()?;
    }
    decode_place_fields_after_depth(r, flags, depth)
}

fn decode_place_fields_after_depth(
    r: &mut SwfReader<'_>,
    flags: u16,
    depth: u16,
) -> Result<PlaceObject, SwfError> {
    let mut place = PlaceObject {
        flags,
        depth,
        ..Default::default()
    };
    if flags & PF_CHAR != 0 {
        place.character_id = Some(r.read_u16()?);
    }
    if flags & PF_MATRIX != 0 {
        place.matrix = Some(Matrix::decode(r)?);
    }
    if flags & PF_CXFORM != 0 {
        place.cxform = Some(Cxform::decode(r, true)?);
    }
    if flags & PF_RATIO != 0 {
        place.ratio = Some(r.read_u16()?);
    }
    if flags & PF_NAME != 0 {
        place.name = Some(r.read_cstr()?.to_vec());
    }
    if flags & PF_CLIPDEPTH != 0 {
        place.clip_depth = Some(r.read_u16()?);
    }
    // Clip actions and PlaceObject3 extras (filters, blend modes) are not
    // decoded; their flag bits already classify the record as unsupported.
    Ok(place)
}

/// Decode the depth of either remove-object variant
pub fn decode_remove_object(tag: &Tag<'_>) -> Result<u16, SwfError> {
    let mut r = SwfReader::new(tag.body);
    match TagCode::from_u16(tag.code) {
        Some(TagCode::RemoveObject) => {
            r.read_u16()?; // character id
            r.read_u16()
        }
        Some(TagCode::RemoveObject2) => r.read_u16(),
        _ => Err(SwfError::BadTagData("not a remove-object tag")),
    }
}

/// Decode a FrameLabel payload
///
/// UTF-8 (lossy) from file version 6 on, Latin-1 for older files.
pub fn decode_frame_label(tag: &Tag<'_>, file_version: u8) -> Result<String, SwfError> {
    let mut r = SwfReader::new(tag.body);
    let bytes = r.read_cstr()?;
    if file_version >= UTF8_FILE_VERSION {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    } else {
        Ok(bytes.iter().map(|&b| b as char).collect())
    }
}
