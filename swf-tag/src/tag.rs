//! Tag records and the forward-only tag stream

use crate::error::SwfError;
use crate::reader::SwfReader;

/// Known SWF tag codes
///
/// Only the vocabulary the converter understands; everything else stays a
/// raw `u16` and is classified by the consumer as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TagCode {
    End = 0,
    ShowFrame = 1,
    DefineShape = 2,
    PlaceObject = 4,
    RemoveObject = 5,
    DefineBitsJpeg = 6,
    JpegTables = 8,
    SetBackgroundColor = 9,
    DefineBitsLossless = 20,
    DefineBitsJpeg2 = 21,
    DefineShape2 = 22,
    PlaceObject2 = 26,
    RemoveObject2 = 28,
    DefineShape3 = 32,
    DefineBitsJpeg3 = 35,
    DefineBitsLossless2 = 36,
    FrameLabel = 43,
    FileAttributes = 69,
    PlaceObject3 = 70,
    SymbolClass = 76,
    Metadata = 77,
    DoAbc = 82,
    DefineShape4 = 83,
    SceneDescription = 86,
}

impl TagCode {
    pub fn from_u16(code: u16) -> Option<Self> {
        Some(match code {
            0 => Self::End,
            1 => Self::ShowFrame,
            2 => Self::DefineShape,
            4 => Self::PlaceObject,
            5 => Self::RemoveObject,
            6 => Self::DefineBitsJpeg,
            8 => Self::JpegTables,
            9 => Self::SetBackgroundColor,
            20 => Self::DefineBitsLossless,
            21 => Self::DefineBitsJpeg2,
            22 => Self::DefineShape2,
            26 => Self::PlaceObject2,
            28 => Self::RemoveObject2,
            32 => Self::DefineShape3,
            35 => Self::DefineBitsJpeg3,
            36 => Self::DefineBitsLossless2,
            43 => Self::FrameLabel,
            69 => Self::FileAttributes,
            70 => Self::PlaceObject3,
            76 => Self::SymbolClass,
            77 => Self::Metadata,
            82 => Self::DoAbc,
            83 => Self::DefineShape4,
            86 => Self::SceneDescription,
            _ => return None,
        })
    }

    /// Human-readable tag name for diagnostics
    pub fn name(code: u16) -> Option<&'static str> {
        Some(match Self::from_u16(code)? {
            Self::End => "End",
            Self::ShowFrame => "ShowFrame",
            Self::DefineShape => "DefineShape",
            Self::PlaceObject => "PlaceObject",
            Self::RemoveObject => "RemoveObject",
            Self::DefineBitsJpeg => "DefineBits",
            Self::JpegTables => "JPEGTables",
            Self::SetBackgroundColor => "SetBackgroundColor",
            Self::DefineBitsLossless => "DefineBitsLossless",
            Self::DefineBitsJpeg2 => "DefineBitsJPEG2",
            Self::DefineShape2 => "DefineShape2",
            Self::PlaceObject2 => "PlaceObject2",
            Self::RemoveObject2 => "RemoveObject2",
            Self::DefineShape3 => "DefineShape3",
            Self::DefineBitsJpeg3 => "DefineBitsJPEG3",
            Self::DefineBitsLossless2 => "DefineBitsLossless2",
            Self::FrameLabel => "FrameLabel",
            Self::FileAttributes => "FileAttributes",
            Self::PlaceObject3 => "PlaceObject3",
            Self::SymbolClass => "SymbolClass",
            Self::Metadata => "Metadata",
            Self::DoAbc => "DoABC",
            Self::DefineShape4 => "DefineShape4",
            Self::SceneDescription => "DefineSceneAndFrameLabelData",
        })
    }
}

/// One raw tag record: numeric code, payload bytes, position in the body
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    pub code: u16,
    pub body: &'a [u8],
    /// Byte offset of the tag header within the (decompressed) body
    pub offset: usize,
}

impl<'a> Tag<'a> {
    /// Character id for definition tags (first payload u16)
    pub fn character_id(&self) -> Result<u16, SwfError> {
        let mut r = SwfReader::new(self.body);
        r.read_u16()
    }
}

/// Lazy forward-only iterator over the tag records of a container body
pub struct TagStream<'a> {
    body: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> TagStream<'a> {
    pub(crate) fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for TagStream<'a> {
    type Item = Result<Tag<'a>, SwfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.body.len() {
            return None;
        }
        let offset = self.pos;
        let mut r = SwfReader::new(&self.body[self.pos..]);
        let head = match r.read_u16() {
            Ok(v) => v,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let code = head >> 6;
        let mut len = (head & 0x3F) as usize;
        if len == 0x3F {
            len = match r.read_u32() {
                Ok(v) => v as usize,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
        }
        let body = match r.read_bytes(len) {
            Ok(b) => b,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.pos += r.position();
        if code == TagCode::End as u16 {
            // End tag terminates the stream; it is still yielded once
            self.done = true;
        }
        Some(Ok(Tag { code, body, offset }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;

    #[test]
    fn test_short_and_long_tags() {
        let mut bytes = build::tag(TagCode::ShowFrame as u16, &[]);
        let long_body = vec![0xAA; 70];
        bytes.extend_from_slice(&build::tag(TagCode::Metadata as u16, &long_body));
        bytes.extend_from_slice(&build::tag(TagCode::End as u16, &[]));

        let tags: Vec<_> = TagStream::new(&bytes).collect::<Result<_, _>>().unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].code, TagCode::ShowFrame as u16);
        assert!(tags[0].body.is_empty());
        assert_eq!(tags[1].code, TagCode::Metadata as u16);
        assert_eq!(tags[1].body, &long_body[..]);
        assert_eq!(tags[2].code, TagCode::End as u16);
    }

    #[test]
    fn test_stream_stops_at_end_tag() {
        let mut bytes = build::tag(TagCode::End as u16, &[]);
        bytes.extend_from_slice(&build::tag(TagCode::ShowFrame as u16, &[]));
        let tags: Vec<_> = TagStream::new(&bytes).collect::<Result<_, _>>().unwrap();
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_truncated_tag_is_eof() {
        let head = (4u16 << 6) | 10; // claims 10 payload bytes
        let bytes = head.to_le_bytes();
        let mut stream = TagStream::new(&bytes);
        assert!(matches!(stream.next(), Some(Err(SwfError::UnexpectedEof))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_unknown_code_maps_to_none() {
        assert_eq!(TagCode::from_u16(999), None);
        assert_eq!(TagCode::from_u16(43), Some(TagCode::FrameLabel));
        assert_eq!(TagCode::name(82), Some("DoABC"));
    }
}
