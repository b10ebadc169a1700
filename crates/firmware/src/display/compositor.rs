//! Region compositor
//!
//! Copies a bottom-up [`RenderedImage`] into the [`PlaneStore`] at a
//! top-left screen position. `x` is snapped down to its byte boundary; the
//! image width must be a whole number of bytes.

use platform::PlaneKind;

use super::image::RenderedImage;
use super::planes::PlaneStore;
use super::{DisplayError, DISPLAY_HEIGHT, DISPLAY_WIDTH, ROW_STRIDE};

/// How source bytes combine with the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositeMode {
    /// `dst = src`
    Opaque,
    /// `dst &= src`: ink accumulates, background never erases.
    Transparent,
}

impl CompositeMode {
    /// `Transparent` when `transparent` is set.
    pub const fn from_transparent(transparent: bool) -> Self {
        if transparent {
            Self::Transparent
        } else {
            Self::Opaque
        }
    }

    #[inline]
    fn apply(self, dst: u8, src: u8) -> u8 {
        match self {
            Self::Opaque => src,
            Self::Transparent => dst & src,
        }
    }
}

/// Composite `image` onto both planes with its top-left corner at `(x, y)`.
///
/// The destination is validated before any byte is written; a region that
/// does not fit returns [`DisplayError::OutOfBounds`] and leaves the planes
/// untouched. Empty images are a no-op.
pub fn composite(
    planes: &mut PlaneStore,
    image: &RenderedImage,
    x: u16,
    y: u16,
    mode: CompositeMode,
) -> Result<(), DisplayError> {
    if image.is_empty() {
        return Ok(());
    }
    let start = destination_cursor(image, x, y)?;

    for kind in [PlaneKind::Old, PlaneKind::New] {
        blit(planes.plane_mut(kind), image.plane(kind), image.row_bytes(), start, mode)?;
    }
    Ok(())
}

fn destination_cursor(image: &RenderedImage, x: u16, y: u16) -> Result<usize, DisplayError> {
    let width = image.width();
    let height = image.height();
    if width % 8 != 0 {
        return Err(DisplayError::OutOfBounds);
    }
    let snapped_x = u32::from(x & !7);
    if snapped_x.saturating_add(u32::from(width)) > u32::from(DISPLAY_WIDTH)
        || u32::from(y).saturating_add(u32::from(height)) > u32::from(DISPLAY_HEIGHT)
    {
        return Err(DisplayError::OutOfBounds);
    }
    let expected = image
        .row_bytes()
        .checked_mul(usize::from(height))
        .ok_or(DisplayError::OutOfBounds)?;
    if image.buffer_size() != expected {
        return Err(DisplayError::OutOfBounds);
    }
    PlaneStore::cursor_for(x, y, height).ok_or(DisplayError::OutOfBounds)
}

fn blit(
    dst: &mut [u8],
    src: &[u8],
    row_bytes: usize,
    start: usize,
    mode: CompositeMode,
) -> Result<(), DisplayError> {
    for (row, src_row) in src.chunks_exact(row_bytes).enumerate() {
        let offset = row
            .checked_mul(ROW_STRIDE)
            .and_then(|o| o.checked_add(start))
            .ok_or(DisplayError::OutOfBounds)?;
        let end = offset
            .checked_add(row_bytes)
            .ok_or(DisplayError::OutOfBounds)?;
        let dst_row = dst.get_mut(offset..end).ok_or(DisplayError::OutOfBounds)?;
        for (d, s) in dst_row.iter_mut().zip(src_row) {
            *d = mode.apply(*d, *s);
        }
    }
    Ok(())
}
