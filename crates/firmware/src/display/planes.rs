//! Two-plane packed framebuffer
//!
//! Each plane is 240×416 pixels at 1 bit per pixel, MSB-first. Rows are
//! stored bottom-up: memory row `m` holds screen row `H - 1 - m`, which is
//! the order BMP files and the flush loop use.
//!
//! ```text
//! memory row 0    → screen row 415 (bottom)
//! memory row 415  → screen row 0   (top)
//! ```

use alloc::boxed::Box;
use alloc::vec;

use platform::PlaneKind;

use super::gray::GrayLevel;
use super::{DisplayError, DISPLAY_HEIGHT, DISPLAY_WIDTH, PLANE_BYTES, ROW_STRIDE};

/// Bit value of an inked pixel.
pub const INK: u8 = 0;
/// Bit value of a background (white) pixel.
pub const BACKGROUND: u8 = 1;
/// Eight inked pixels.
pub const INK_BYTE: u8 = 0x00;
/// Eight background pixels.
pub const BACKGROUND_BYTE: u8 = 0xFF;

/// Convert a byte of ink flags (`1` = ink) into panel polarity (`0` = ink).
///
/// Rasterizers build ink masks; everything that reaches a plane or the
/// panel goes through here exactly once.
#[inline]
pub const fn ink_to_panel(ink_mask: u8) -> u8 {
    !ink_mask
}

/// Owned `old` and `new` planes.
///
/// Both planes are heap allocated so a `PlaneStore` can live on any task
/// stack.
pub struct PlaneStore {
    old: Box<[u8]>,
    new: Box<[u8]>,
}

impl PlaneStore {
    /// Create a store with both planes cleared to background.
    pub fn new() -> Self {
        Self {
            old: vec![BACKGROUND_BYTE; PLANE_BYTES].into_boxed_slice(),
            new: vec![BACKGROUND_BYTE; PLANE_BYTES].into_boxed_slice(),
        }
    }

    /// Fill both planes with background.
    pub fn clear(&mut self) {
        self.old.fill(BACKGROUND_BYTE);
        self.new.fill(BACKGROUND_BYTE);
    }

    /// Plane byte holding the bottom-left pixel of a `height`-row region
    /// whose top-left corner is `(x, y)`: `((H - y - height) * W + x) / 8`.
    ///
    /// Returns `None` when the region extends past the bottom of the panel.
    pub fn cursor_for(x: u16, y: u16, height: u16) -> Option<usize> {
        let memory_row = DISPLAY_HEIGHT.checked_sub(y)?.checked_sub(height)?;
        let bit = usize::from(memory_row)
            .checked_mul(usize::from(DISPLAY_WIDTH))?
            .checked_add(usize::from(x))?;
        Some(bit / 8)
    }

    /// Read one byte of `kind`.
    pub fn byte_at(&self, kind: PlaneKind, cursor: usize) -> Result<u8, DisplayError> {
        self.plane(kind)
            .get(cursor)
            .copied()
            .ok_or(DisplayError::OutOfBounds)
    }

    /// Overwrite one byte of `kind`.
    pub fn set_byte(&mut self, kind: PlaneKind, cursor: usize, value: u8) -> Result<(), DisplayError> {
        let byte = self
            .plane_mut(kind)
            .get_mut(cursor)
            .ok_or(DisplayError::OutOfBounds)?;
        *byte = value;
        Ok(())
    }

    /// Whole plane in memory order.
    pub fn plane(&self, kind: PlaneKind) -> &[u8] {
        match kind {
            PlaneKind::Old => &self.old,
            PlaneKind::New => &self.new,
        }
    }

    pub(crate) fn plane_mut(&mut self, kind: PlaneKind) -> &mut [u8] {
        match kind {
            PlaneKind::Old => &mut self.old,
            PlaneKind::New => &mut self.new,
        }
    }

    /// Both planes at once, old first.
    pub(crate) fn planes_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut self.old, &mut self.new)
    }

    /// Memory row `memory_row` (screen row `H - 1 - memory_row`).
    pub fn row(&self, kind: PlaneKind, memory_row: u16) -> Option<&[u8]> {
        let start = usize::from(memory_row).checked_mul(ROW_STRIDE)?;
        let end = start.checked_add(ROW_STRIDE)?;
        self.plane(kind).get(start..end)
    }

    /// Bit of screen pixel `(x, y)` in `kind`: [`INK`] or [`BACKGROUND`].
    pub fn pixel(&self, kind: PlaneKind, x: u16, y: u16) -> Option<u8> {
        if x >= DISPLAY_WIDTH {
            return None;
        }
        let cursor = Self::cursor_for(x, y, 1)?;
        let byte = self.plane(kind).get(cursor)?;
        // x % 8 < 8, so the shift is in range.
        #[allow(clippy::arithmetic_side_effects)]
        let bit = (byte >> (7 - x % 8)) & 1;
        Some(bit)
    }

    /// `true` when screen pixel `(x, y)` of `kind` is inked.
    pub fn is_ink(&self, kind: PlaneKind, x: u16, y: u16) -> Option<bool> {
        self.pixel(kind, x, y).map(|bit| bit == INK)
    }

    /// Gray level shown at screen pixel `(x, y)` after a grayscale refresh.
    pub fn gray_level(&self, x: u16, y: u16) -> Option<GrayLevel> {
        let old_ink = self.is_ink(PlaneKind::Old, x, y)?;
        let new_ink = self.is_ink(PlaneKind::New, x, y)?;
        Some(GrayLevel::from_planes(!old_ink, !new_ink))
    }
}

impl Default for PlaneStore {
    fn default() -> Self {
        Self::new()
    }
}
