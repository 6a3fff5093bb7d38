//! SWF container parsing
//!
//! The container is an 8-byte clear header (signature, file version, total
//! length) followed by a body that is either plain (`FWS`) or a single zlib
//! stream (`CWS`). The body starts with the movie bounds RECT, the 8.8
//! fixed-point frame rate and the frame count, then the tag stream.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::SwfError;
use crate::reader::SwfReader;
use crate::tag::TagStream;
use crate::types::Rect;

/// A parsed SWF container: header fields plus the decompressed tag body
#[derive(Debug)]
pub struct Swf {
    /// SWF file format version (controls string encodings)
    pub version: u8,
    /// Movie bounds in twips
    pub movie_size: Rect,
    /// 8.8 fixed-point frames per second
    pub frame_rate: u16,
    /// Declared number of animation frames
    pub frame_count: u16,
    body: Vec<u8>,
    /// Offset of the first tag within `body`
    tags_start: usize,
}

impl Swf {
    /// Parse a container from raw file bytes
    pub fn parse(data: &[u8]) -> Result<Self, SwfError> {
        if data.len() < 8 {
            return Err(SwfError::TooSmall);
        }
        let sig = [data[0], data[1], data[2]];
        let version = data[3];
        let compressed = match &sig {
            b"FWS" => false,
            b"CWS" => true,
            b"ZWS" => return Err(SwfError::UnsupportedCompression),
            _ => return Err(SwfError::InvalidSignature(sig)),
        };
        // Declared uncompressed length includes the 8 header bytes
        let declared_len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;

        let body = if compressed {
            let expected = declared_len.saturating_sub(8);
            let mut decoder = ZlibDecoder::new(&data[8..]);
            let mut body = Vec::with_capacity(expected);
            decoder
                .read_to_end(&mut body)
                .map_err(|_| SwfError::BadCompressedBody)?;
            body
        } else {
            data[8..].to_vec()
        };

        let mut r = SwfReader::new(&body);
        let movie_size = Rect::decode(&mut r)?;
        let frame_rate = r.read_u16()?;
        let frame_count = r.read_u16()?;
        let tags_start = r.position();

        Ok(Self {
            version,
            movie_size,
            frame_rate,
            frame_count,
            body,
            tags_start,
        })
    }

    /// Iterate the tag records, one forward pass
    pub fn tags(&self) -> TagStream<'_> {
        TagStream::new(&self.body[self.tags_start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;
    use crate::tag::TagCode;

    fn sample_tags() -> Vec<u8> {
        let mut tags = build::tag(TagCode::ShowFrame as u16, &[]);
        tags.extend_from_slice(&build::tag(TagCode::End as u16, &[]));
        tags
    }

    #[test]
    fn test_parse_uncompressed() {
        let tags = sample_tags();
        let bytes = build::swf(6, 0x0c00, 1, build::rect_px(0, 0, 100, 50), &[tags]);
        let swf = Swf::parse(&bytes).unwrap();
        assert_eq!(swf.version, 6);
        assert_eq!(swf.frame_rate, 0x0c00);
        assert_eq!(swf.frame_count, 1);
        assert_eq!(swf.movie_size.width(), 100 * 20);
        assert_eq!(swf.movie_size.height(), 50 * 20);
        assert_eq!(swf.tags().count(), 2);
    }

    #[test]
    fn test_parse_compressed() {
        let tags = sample_tags();
        let bytes = build::swf_compressed(6, 0x0c00, 1, build::rect_px(0, 0, 100, 50), &[tags]);
        assert_eq!(&bytes[..3], b"CWS");
        let swf = Swf::parse(&bytes).unwrap();
        assert_eq!(swf.frame_count, 1);
        assert_eq!(swf.tags().count(), 2);
    }

    #[test]
    fn test_bad_signature() {
        let bytes = b"XWS\x06\x08\x00\x00\x00";
        assert!(matches!(
            Swf::parse(bytes),
            Err(SwfError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_lzma_unsupported() {
        let bytes = b"ZWS\x0d\x08\x00\x00\x00";
        assert!(matches!(
            Swf::parse(bytes),
            Err(SwfError::UnsupportedCompression)
        ));
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(Swf::parse(b"FWS"), Err(SwfError::TooSmall)));
    }
}
