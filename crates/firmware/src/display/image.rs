//! Rendered images ready for compositing or streaming

use alloc::vec::Vec;

use platform::PlaneKind;

use super::DisplayError;

/// Whether an image carries one plane or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageKind {
    /// One buffer written to both planes
    Monochrome,
    /// Separate `old` and `new` buffers
    Grayscale,
}

impl core::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Monochrome => write!(f, "monochrome"),
            Self::Grayscale => write!(f, "grayscale"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Planes {
    Mono(Vec<u8>),
    Gray { old: Vec<u8>, new: Vec<u8> },
}

/// Packed 1bpp image, MSB-first, `width` a multiple of 8.
///
/// Row order depends on the producer: the bitmap decoder and the text
/// rasterizer in flipped mode emit bottom-up rows for the compositor, the
/// unflipped rasterizer emits upright rows for direct panel writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: u16,
    height: u16,
    planes: Planes,
}

impl RenderedImage {
    /// Single-buffer image. `data` must hold `width / 8 * height` bytes.
    pub fn monochrome(width: u16, height: u16, data: Vec<u8>) -> Result<Self, DisplayError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            planes: Planes::Mono(data),
        })
    }

    /// Two-buffer image. Both buffers must hold `width / 8 * height` bytes.
    pub fn grayscale(
        width: u16,
        height: u16,
        old: Vec<u8>,
        new: Vec<u8>,
    ) -> Result<Self, DisplayError> {
        check_len(width, height, old.len())?;
        check_len(width, height, new.len())?;
        Ok(Self {
            width,
            height,
            planes: Planes::Gray { old, new },
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Monochrome or grayscale
    pub fn kind(&self) -> ImageKind {
        match self.planes {
            Planes::Mono(_) => ImageKind::Monochrome,
            Planes::Gray { .. } => ImageKind::Grayscale,
        }
    }

    /// Bytes per row
    pub fn row_bytes(&self) -> usize {
        usize::from(self.width / 8)
    }

    /// Bytes per plane
    pub fn buffer_size(&self) -> usize {
        self.plane(PlaneKind::New).len()
    }

    /// Buffer destined for plane `kind`.
    pub fn plane(&self, kind: PlaneKind) -> &[u8] {
        match (&self.planes, kind) {
            (Planes::Mono(data), _) => data,
            (Planes::Gray { old, .. }, PlaneKind::Old) => old,
            (Planes::Gray { new, .. }, PlaneKind::New) => new,
        }
    }

    /// `true` when the image covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn check_len(width: u16, height: u16, len: usize) -> Result<(), DisplayError> {
    if width % 8 != 0 {
        return Err(DisplayError::OutOfBounds);
    }
    let expected = usize::from(width / 8)
        .checked_mul(usize::from(height))
        .ok_or(DisplayError::OutOfBounds)?;
    if len == expected {
        Ok(())
    } else {
        Err(DisplayError::OutOfBounds)
    }
}
