//! Conversion errors and their stable result codes
//!
//! The runtime's scripting side matches on the numeric codes, so the
//! mapping in [`ConvertError::code`] must never be renumbered.

use thiserror::Error;

/// Human-readable name for a fill style type byte
fn fill_style_name(type_byte: u8) -> String {
    match type_byte {
        0x00 => "SOLID".into(),
        0x10 | 0x11 => "LINEAR_GRADIENT".into(),
        0x12 | 0x13 => "RADIAL_GRADIENT".into(),
        0x40..=0x43 => "BITMAP".into(),
        other => format!("0x{other:02x}"),
    }
}

/// Tag display name for diagnostics (falls back to the numeric code)
fn tag_display_name(code: u16) -> String {
    match swf_tag::TagCode::name(code) {
        Some(name) => name.into(),
        None => code.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("Unable to open SWF file.")]
    InputFileOpen,

    #[error("SWF file format error.")]
    InputFileFormat,

    #[error("Broken SWF file ({0}).")]
    InputFileBadData(String),

    #[error("Cannot export line styles to SAM.")]
    UnsupportedLineStyles { shape_id: u16 },

    #[error("Cannot export fill style '{}' for shape #{shape_id} to SAM.", fill_style_name(*type_byte))]
    UnsupportedFillStyle { type_byte: u8, shape_id: u16 },

    #[error("Cannot export shape to SAM (Vector graphics shape #{shape_id} is unsupported).")]
    UnsupportedVectorShape { shape_id: u16 },

    #[error("Cannot export shape to SAM (Multi-color shape #{shape_id} is unsupported).")]
    UnsupportedMulticolorShape { shape_id: u16 },

    #[error("Cannot export shape to SAM (Multi-bitmap shape #{shape_id} is unsupported).")]
    UnsupportedMultibitmapShape { shape_id: u16 },

    #[error("Cannot export shape to SAM (No bitmap shape #{shape_id} is unsupported).")]
    UnsupportedNobitmapShape { shape_id: u16 },

    #[error("Cannot export object with flags 0x{0:04x} to SAM.")]
    UnsupportedObjectFlags(u16),

    #[error("Cannot export object with depth {0} to SAM.")]
    UnsupportedObjectDepth(u32),

    #[error("Cannot export more than {0} shapes to SAM.")]
    UnsupportedShapeCount(u32),

    #[error("Cannot export more than {0} places and/or removes to SAM.")]
    UnsupportedDisplayCount(u32),

    #[error("Cannot export additive color to SAM version 1.")]
    UnsupportedAddColor,

    #[error("Cannot export tag '{}' to SAM.", tag_display_name(*.0))]
    UnsupportedTag(u16),

    #[error("Unknown image id {0:04}.")]
    UnknownImageId(u16),

    #[error("Unknown shape id {0:04}.")]
    UnknownShapeId(u16),

    #[error("Unable to make output directory.")]
    OutputDir,

    #[error("Unable to write file '{0}'.")]
    OutputFileWrite(String),

    #[error("Unable to open configuration file.")]
    ConfigOpen,

    #[error("Unable to parse configuration file.")]
    ConfigParse,

    #[error("Bad scale value.")]
    BadScaleValue,

    #[error("Bad SAM version.")]
    BadSamVersion,
}

impl ConvertError {
    /// Stable result code, doubling as the process exit code
    pub fn code(&self) -> i32 {
        match self {
            Self::InputFileOpen => 1,
            Self::InputFileFormat => 2,
            Self::InputFileBadData(_) => 3,
            Self::UnsupportedLineStyles { .. } => 4,
            Self::UnsupportedFillStyle { .. } => 5,
            Self::UnsupportedVectorShape { .. } => 6,
            Self::UnsupportedMulticolorShape { .. } => 7,
            Self::UnsupportedMultibitmapShape { .. } => 8,
            Self::UnsupportedNobitmapShape { .. } => 9,
            Self::UnsupportedObjectFlags(_) => 10,
            Self::UnsupportedObjectDepth(_) => 11,
            Self::UnsupportedShapeCount(_) => 12,
            Self::UnsupportedDisplayCount(_) => 13,
            Self::UnsupportedAddColor => 14,
            Self::UnsupportedTag(_) => 15,
            Self::UnknownImageId(_) => 16,
            Self::UnknownShapeId(_) => 17,
            Self::OutputDir => 18,
            Self::OutputFileWrite(_) => 19,
            Self::ConfigOpen => 20,
            Self::ConfigParse => 21,
            Self::BadScaleValue => 22,
            Self::BadSamVersion => 23,
        }
    }

    /// Whether `--skip-unsupported` may downgrade this error to a warning
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLineStyles { .. }
                | Self::UnsupportedFillStyle { .. }
                | Self::UnsupportedVectorShape { .. }
                | Self::UnsupportedMulticolorShape { .. }
                | Self::UnsupportedMultibitmapShape { .. }
                | Self::UnsupportedNobitmapShape { .. }
                | Self::UnsupportedObjectFlags(_)
        )
    }
}
