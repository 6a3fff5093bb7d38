//! SAM format version policy
//!
//! The two encodings share one serialization algorithm; everything that
//! differs between them is a constant hanging off [`SamVersion`].

/// Target format generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamVersion {
    V1 = 1,
    V2 = 2,
}

impl SamVersion {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Highest encodable display-list depth
    pub fn max_depth(self) -> u32 {
        match self {
            Self::V1 => 0x3FF,
            Self::V2 => 0xFFF,
        }
    }

    /// Depth bits within a move record's depth-and-flags word
    pub fn depth_mask(self) -> u16 {
        match self {
            Self::V1 => 0x3FF,
            Self::V2 => 0xFFF,
        }
    }

    /// Largest per-frame remove/add/move section length
    pub fn max_display_count(self) -> usize {
        match self {
            Self::V1 => 0xFF,
            Self::V2 => 0xFFFF,
        }
    }

    /// Largest shape table size (also bounds shape ids)
    pub fn max_shape_count(self) -> usize {
        match self {
            Self::V1 => 0xFF,
            Self::V2 => 0xFFFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_table() {
        assert_eq!(SamVersion::from_u32(1), Some(SamVersion::V1));
        assert_eq!(SamVersion::from_u32(2), Some(SamVersion::V2));
        assert_eq!(SamVersion::from_u32(3), None);
        assert_eq!(SamVersion::from_u32(0), None);

        assert_eq!(SamVersion::V1.max_depth(), 1023);
        assert_eq!(SamVersion::V2.max_depth(), 4095);
        assert_eq!(SamVersion::V1.max_display_count(), 255);
        assert_eq!(SamVersion::V2.max_display_count(), 65535);
        assert_eq!(SamVersion::V1.max_shape_count(), 255);
        assert_eq!(SamVersion::V2.max_shape_count(), 65535);
    }
}
