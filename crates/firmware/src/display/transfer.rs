//! Sub-byte rectangle transfers
//!
//! The controller window is byte aligned, so a region whose left or right
//! edge falls inside a byte is sent as a wider row. The pixels of those
//! edge bytes that lie outside the region are forced to background with
//! the border masks.
//!
//! ```text
//! x = 3, width = 10        window bytes: 2
//! byte 0: BBB.....         border_left  = 0b1110_0000
//! byte 1: .....BBB         border_right = 0b0000_0111
//! ```

use super::planes::ink_to_panel;
use super::DisplayError;

/// `(border_left, border_right)` for a region starting at `x`, `width`
/// pixels wide. Set bits mark pixels outside the region; a mask is zero
/// when its edge is byte aligned.
// x % 8 and the edge remainder are both below 8, so every shift is in range.
#[allow(clippy::arithmetic_side_effects)]
pub const fn border_masks(x: u16, width: u16) -> (u8, u8) {
    let lead = (x % 8) as u32;
    let end = (x as u32 + width as u32) % 8;
    let left = if lead == 0 { 0 } else { !(0xFF_u8 >> lead) };
    let right = if end == 0 { 0 } else { !(0xFF_u8 << (8 - end)) };
    (left, right)
}

/// Bytes per row of the byte-aligned window around `x .. x + width`.
///
/// Zero for an empty region.
#[allow(clippy::arithmetic_side_effects)]
pub const fn window_bytes(x: u16, width: u16) -> usize {
    if width == 0 {
        return 0;
    }
    let first = x as usize / 8;
    let last = (x as usize + width as usize - 1) / 8;
    last - first + 1
}

/// Fill one window row for a solid `value`.
///
/// `out` must be exactly [`window_bytes`] long. The first byte is
/// `value | border_left`, the last `value | border_right`, interior bytes
/// `value`.
pub fn fill_row(value: u8, x: u16, width: u16, out: &mut [u8]) -> Result<(), DisplayError> {
    if out.len() != window_bytes(x, width) {
        return Err(DisplayError::OutOfBounds);
    }
    let (left, right) = border_masks(x, width);
    out.fill(value);
    if let Some(first) = out.first_mut() {
        *first |= left;
    }
    if let Some(last) = out.last_mut() {
        *last |= right;
    }
    Ok(())
}

/// Shift one packed row into its window.
///
/// `src` holds `ceil(width / 8)` bytes with region pixel 0 at the MSB of
/// the first byte. Pixels of `out` outside `x .. x + width` become
/// background, including any padding bits at the end of `src`.
// Shift amounts are `x % 8` and `8 - x % 8` with a nonzero remainder;
// indices are bounded by the length check above each loop.
#[allow(clippy::arithmetic_side_effects)]
pub fn shift_row(src: &[u8], x: u16, width: u16, out: &mut [u8]) -> Result<(), DisplayError> {
    let src_bytes = usize::from(width).div_ceil(8);
    let src = src.get(..src_bytes).ok_or(DisplayError::OutOfBounds)?;
    if out.len() != window_bytes(x, width) {
        return Err(DisplayError::OutOfBounds);
    }

    let shift = u32::from(x % 8);
    let tail = width % 8;
    out.fill(0);
    for (k, byte) in src.iter().enumerate() {
        let mut ink = !*byte;
        if k + 1 == src_bytes && tail != 0 {
            ink &= 0xFF << (8 - tail);
        }
        if let Some(dst) = out.get_mut(k) {
            *dst |= ink >> shift;
        }
        if shift != 0 {
            if let Some(dst) = out.get_mut(k + 1) {
                *dst |= ink << (8 - shift);
            }
        }
    }
    for byte in out.iter_mut() {
        *byte = ink_to_panel(*byte);
    }
    Ok(())
}
