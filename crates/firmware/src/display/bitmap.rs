//! BMP asset decoder
//!
//! Badge assets are uncompressed BMP files:
//!
//! - **4 bpp** (palette indices 0 black, 1 light gray, 2 dark gray, 3 and
//!   above white) decode
//!   to a [`ImageKind::Grayscale`] image, one bit per pixel in each plane.
//! - **1 bpp** decodes to a [`ImageKind::Monochrome`] image (index 1 is
//!   background).
//!
//! BMP rows are stored bottom-up, the same order as the planes, so rows
//! are never reordered. Width must be a multiple of 8.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 2 | `BM` signature |
//! | 0x0A | 4 | pixel array offset |
//! | 0x12 | 4 | width (signed) |
//! | 0x16 | 4 | height (signed; negative = top-down, rejected) |
//! | 0x1C | 2 | bits per pixel |
//! | 0x22 | 4 | pixel array size (0 allowed) |

use alloc::vec::Vec;

use super::image::{ImageKind, RenderedImage};
use super::planes::PlaneStore;
use super::{DisplayError, DISPLAY_HEIGHT, DISPLAY_WIDTH, PLANE_BYTES};

const HEADER_LEN: usize = 0x26;

/// Parsed fields of a BMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    /// Start of the pixel array
    pub pixel_offset: usize,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// 1 or 4
    pub bits_per_pixel: u16,
    /// Declared pixel array size, 0 when unset
    pub image_size: u32,
}

impl BmpHeader {
    /// Parse and validate the header of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, DisplayError> {
        if bytes.len() < HEADER_LEN || bytes.get(..2) != Some(b"BM".as_slice()) {
            return Err(DisplayError::InvalidAsset);
        }
        let pixel_offset = usize::try_from(read_u32(bytes, 0x0A)?)
            .map_err(|_| DisplayError::InvalidAsset)?;
        let width = read_i32(bytes, 0x12)?;
        let height = read_i32(bytes, 0x16)?;
        let bits_per_pixel = read_u16(bytes, 0x1C)?;
        let image_size = read_u32(bytes, 0x22)?;

        if width <= 0 || height <= 0 || width % 8 != 0 {
            return Err(DisplayError::InvalidAsset);
        }
        if bits_per_pixel != 1 && bits_per_pixel != 4 {
            return Err(DisplayError::InvalidAsset);
        }
        Ok(Self {
            pixel_offset,
            width: u16::try_from(width).map_err(|_| DisplayError::InvalidAsset)?,
            height: u16::try_from(height).map_err(|_| DisplayError::InvalidAsset)?,
            bits_per_pixel,
            image_size,
        })
    }

    /// Monochrome for 1 bpp, grayscale for 4 bpp.
    pub fn kind(&self) -> ImageKind {
        if self.bits_per_pixel == 4 {
            ImageKind::Grayscale
        } else {
            ImageKind::Monochrome
        }
    }

    /// Bytes per output plane.
    ///
    /// Always derived from the dimensions. For 4 bpp a non-zero declared
    /// size may exceed it but must cover it: four source bytes fold into
    /// one plane byte.
    pub fn plane_bytes(&self) -> Result<usize, DisplayError> {
        let bytes = usize::from(self.width / 8)
            .checked_mul(usize::from(self.height))
            .ok_or(DisplayError::InvalidAsset)?;
        if self.bits_per_pixel == 4 && self.image_size != 0 {
            let declared = usize::try_from(self.image_size / 4).map_err(|_| DisplayError::InvalidAsset)?;
            if declared < bytes {
                return Err(DisplayError::InvalidAsset);
            }
        }
        Ok(bytes)
    }

    /// Source bytes per stored row, including padding to 32 bits.
    fn source_row_bytes(&self) -> usize {
        let bits = usize::from(self.width).saturating_mul(usize::from(self.bits_per_pixel));
        bits.div_ceil(32).saturating_mul(4)
    }

    fn pixels<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], DisplayError> {
        let len = self
            .source_row_bytes()
            .checked_mul(usize::from(self.height))
            .ok_or(DisplayError::InvalidAsset)?;
        let end = self
            .pixel_offset
            .checked_add(len)
            .ok_or(DisplayError::InvalidAsset)?;
        bytes
            .get(self.pixel_offset..end)
            .ok_or(DisplayError::InvalidAsset)
    }
}

fn field<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N], DisplayError> {
    let end = at.checked_add(N).ok_or(DisplayError::InvalidAsset)?;
    bytes
        .get(at..end)
        .and_then(|s| s.try_into().ok())
        .ok_or(DisplayError::InvalidAsset)
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, DisplayError> {
    field(bytes, at).map(u16::from_le_bytes)
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, DisplayError> {
    field(bytes, at).map(u32::from_le_bytes)
}

fn read_i32(bytes: &[u8], at: usize) -> Result<i32, DisplayError> {
    field(bytes, at).map(i32::from_le_bytes)
}

/// `old` plane bit for a 4 bpp palette index (`true` = background).
pub const fn old_bit(index: u8) -> bool {
    index >= 2
}

/// `new` plane bit for a 4 bpp palette index (`true` = background).
pub const fn new_bit(index: u8) -> bool {
    index == 1 || index >= 3
}

/// Fold four 4 bpp source bytes (eight pixels, high nibble first) into one
/// `(old, new)` byte pair.
pub fn fold_nibbles(source: &[u8; 4]) -> (u8, u8) {
    let mut old = 0u8;
    let mut new = 0u8;
    for byte in source {
        for index in [byte >> 4, byte & 0x0F] {
            old = (old << 1) | u8::from(old_bit(index));
            new = (new << 1) | u8::from(new_bit(index));
        }
    }
    (old, new)
}

fn decode_4bpp(pixels: &[u8], old: &mut [u8], new: &mut [u8]) -> Result<(), DisplayError> {
    if pixels.len() < old.len().saturating_mul(4) || old.len() != new.len() {
        return Err(DisplayError::InvalidAsset);
    }
    for ((chunk, o), n) in pixels.chunks_exact(4).zip(old.iter_mut()).zip(new.iter_mut()) {
        let source: &[u8; 4] = chunk.try_into().map_err(|_| DisplayError::InvalidAsset)?;
        (*o, *n) = fold_nibbles(source);
    }
    Ok(())
}

fn decode_1bpp(header: &BmpHeader, pixels: &[u8], out: &mut [u8]) -> Result<(), DisplayError> {
    let row_bytes = usize::from(header.width / 8);
    let stride = header.source_row_bytes();
    if row_bytes == 0 {
        return Err(DisplayError::InvalidAsset);
    }
    for (dst, src) in out.chunks_exact_mut(row_bytes).zip(pixels.chunks(stride)) {
        let src = src.get(..row_bytes).ok_or(DisplayError::InvalidAsset)?;
        dst.copy_from_slice(src);
    }
    Ok(())
}

fn zeroed(len: usize) -> Result<Vec<u8>, DisplayError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DisplayError::Capacity)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Decode a BMP file into a bottom-up image for the compositor.
pub fn decode(bytes: &[u8]) -> Result<RenderedImage, DisplayError> {
    let header = BmpHeader::parse(bytes)?;
    let pixels = header.pixels(bytes)?;
    let len = header.plane_bytes()?;

    match header.kind() {
        ImageKind::Grayscale => {
            let mut old = zeroed(len)?;
            let mut new = zeroed(len)?;
            decode_4bpp(pixels, &mut old, &mut new)?;
            RenderedImage::grayscale(header.width, header.height, old, new)
        }
        ImageKind::Monochrome => {
            let mut data = zeroed(len)?;
            decode_1bpp(&header, pixels, &mut data)?;
            RenderedImage::monochrome(header.width, header.height, data)
        }
    }
}

/// Decode a full-screen BMP straight into both planes.
///
/// The image must be exactly 240×416; anything else is
/// [`DisplayError::OutOfBounds`]. Header, size and truncation checks all
/// run before any plane byte is written.
pub fn decode_into_planes(bytes: &[u8], planes: &mut PlaneStore) -> Result<ImageKind, DisplayError> {
    let header = BmpHeader::parse(bytes)?;
    if header.width != DISPLAY_WIDTH || header.height != DISPLAY_HEIGHT {
        return Err(DisplayError::OutOfBounds);
    }
    let pixels = header.pixels(bytes)?;
    if header.plane_bytes()? != PLANE_BYTES {
        return Err(DisplayError::InvalidAsset);
    }

    let kind = header.kind();
    match kind {
        ImageKind::Grayscale => {
            let (old, new) = planes.planes_mut();
            decode_4bpp(pixels, old, new)?;
        }
        ImageKind::Monochrome => {
            let (old, new) = planes.planes_mut();
            decode_1bpp(&header, pixels, new)?;
            old.copy_from_slice(new);
        }
    }
    debug!("background decoded, {} bytes per plane", PLANE_BYTES);
    Ok(kind)
}
