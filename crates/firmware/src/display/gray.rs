//! Gray levels and fill colors
//!
//! The grayscale waveform drives each pixel from its `(old, new)` plane
//! bits:
//!
//! | old | new | level      |
//! |-----|-----|------------|
//! | 1   | 1   | white      |
//! | 1   | 0   | dark gray  |
//! | 0   | 1   | light gray |
//! | 0   | 0   | black      |

use platform::Waveform;

use super::planes::{BACKGROUND_BYTE, INK_BYTE};

/// One of the four levels the grayscale waveform can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GrayLevel {
    /// old 1, new 1
    White,
    /// old 0, new 1
    LightGray,
    /// old 1, new 0
    DarkGray,
    /// old 0, new 0
    Black,
}

impl GrayLevel {
    /// Level shown for plane bits `old` and `new` (`true` = background bit).
    pub const fn from_planes(old: bool, new: bool) -> Self {
        match (old, new) {
            (true, true) => Self::White,
            (true, false) => Self::DarkGray,
            (false, true) => Self::LightGray,
            (false, false) => Self::Black,
        }
    }

    /// Plane bits `(old, new)` producing this level.
    pub const fn plane_bits(self) -> (bool, bool) {
        match self {
            Self::White => (true, true),
            Self::DarkGray => (true, false),
            Self::LightGray => (false, true),
            Self::Black => (false, false),
        }
    }

    /// Fill bytes `(old, new)` producing this level over eight pixels.
    pub const fn plane_bytes(self) -> (u8, u8) {
        let (old, new) = self.plane_bits();
        (fill_byte(old), fill_byte(new))
    }
}

const fn fill_byte(background: bool) -> u8 {
    if background {
        BACKGROUND_BYTE
    } else {
        INK_BYTE
    }
}

/// Solid color for direct panel fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Black through the partial (bi-level) waveform
    BwBlack,
    /// White through the partial (bi-level) waveform
    BwWhite,
    /// A gray level through the grayscale waveform
    Gray(GrayLevel),
}

impl Color {
    /// Waveform the color needs loaded.
    pub const fn waveform(self) -> Waveform {
        match self {
            Self::BwBlack | Self::BwWhite => Waveform::Partial,
            Self::Gray(_) => Waveform::Grayscale,
        }
    }
}
