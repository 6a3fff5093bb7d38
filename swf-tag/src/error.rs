//! SWF parsing error types

use core::fmt;

/// SWF parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwfError {
    /// File too small to contain the container header
    TooSmall,
    /// Leading signature is not `FWS`/`CWS`
    InvalidSignature([u8; 3]),
    /// `ZWS` (LZMA) containers are not supported
    UnsupportedCompression,
    /// Compressed body failed to inflate
    BadCompressedBody,
    /// Structurally invalid data inside a tag payload
    BadTagData(&'static str),
    /// Ran past the end of the stream
    UnexpectedEof,
    /// IO error during parsing
    IoError(String),
}

impl fmt::Display for SwfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwfError::TooSmall => write!(f, "File too small to contain SWF header"),
            SwfError::InvalidSignature(sig) => write!(
                f,
                "Invalid SWF signature: {:02X} {:02X} {:02X}",
                sig[0], sig[1], sig[2]
            ),
            SwfError::UnsupportedCompression => {
                write!(f, "Unsupported SWF compression (LZMA)")
            }
            SwfError::BadCompressedBody => write!(f, "Failed to inflate SWF body"),
            SwfError::BadTagData(what) => write!(f, "Invalid tag data: {}", what),
            SwfError::UnexpectedEof => write!(f, "Unexpected end of file"),
            SwfError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SwfError {}

impl From<std::io::Error> for SwfError {
    fn from(e: std::io::Error) -> Self {
        SwfError::IoError(e.to_string())
    }
}
