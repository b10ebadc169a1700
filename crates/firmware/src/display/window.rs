//! Partial-area window for the SetPartialArea command
//!
//! The controller addresses columns in whole bytes: the start column is
//! rounded down to a multiple of 8 and the end column up to the last pixel
//! of its byte. Rows are addressed individually.

use platform::Region;

use super::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Inclusive, byte-aligned controller window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartialWindow {
    /// First column, a multiple of 8
    pub x_start: u16,
    /// Last column, `≡ 7 (mod 8)`
    pub x_end: u16,
    /// First row
    pub y_start: u16,
    /// Last row
    pub y_end: u16,
}

impl PartialWindow {
    /// Window covering `region`, or `None` if the region is empty or does
    /// not fit the panel.
    pub fn for_region(region: Region) -> Option<Self> {
        if region.is_empty() || !region.fits_within(DISPLAY_WIDTH, DISPLAY_HEIGHT) {
            return None;
        }
        let last_x = region.x.checked_add(region.width)?.checked_sub(1)?;
        let last_y = region.y.checked_add(region.height)?.checked_sub(1)?;
        Some(Self {
            x_start: region.x & !7,
            x_end: last_x | 7,
            y_start: region.y,
            y_end: last_y,
        })
    }

    /// SetPartialArea payload: `x_lo, xe_lo, y_hi, y_lo, ye_hi, ye_lo, 0x01`.
    ///
    /// Columns fit in one byte on this panel (`W = 240`); the trailing
    /// `0x01` scans inside the window only.
    pub fn encode(&self) -> [u8; 7] {
        let [_, x_lo] = self.x_start.to_be_bytes();
        let [_, xe_lo] = self.x_end.to_be_bytes();
        let [y_hi, y_lo] = self.y_start.to_be_bytes();
        let [ye_hi, ye_lo] = self.y_end.to_be_bytes();
        [x_lo, xe_lo, y_hi, y_lo, ye_hi, ye_lo, 0x01]
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(bytes: &[u8; 7]) -> Self {
        let [x_lo, xe_lo, y_hi, y_lo, ye_hi, ye_lo, _] = *bytes;
        Self {
            x_start: u16::from(x_lo),
            x_end: u16::from(xe_lo),
            y_start: u16::from_be_bytes([y_hi, y_lo]),
            y_end: u16::from_be_bytes([ye_hi, ye_lo]),
        }
    }

    /// The window as a region. Equals the source region when that region
    /// was byte aligned.
    // Window invariants keep end >= start.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn to_region(&self) -> Region {
        Region::new(
            self.x_start,
            self.y_start,
            self.x_end.saturating_sub(self.x_start) + 1,
            self.y_end.saturating_sub(self.y_start) + 1,
        )
    }

    /// Bytes the controller expects per window row.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn bytes_per_row(&self) -> usize {
        usize::from(self.x_end.saturating_sub(self.x_start) / 8) + 1
    }

    /// Rows in the window.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn rows(&self) -> usize {
        usize::from(self.y_end.saturating_sub(self.y_start)) + 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_row_encoding() {
        let w = PartialWindow::for_region(Region::new(0, 415, 240, 1)).unwrap();
        assert_eq!(w.encode(), [0x00, 0xEF, 0x01, 0x9F, 0x01, 0x9F, 0x01]);
        assert_eq!(w.bytes_per_row(), 30);
        assert_eq!(w.rows(), 1);
    }

    #[test]
    fn test_unaligned_edges_widen_to_bytes() {
        let w = PartialWindow::for_region(Region::new(3, 10, 10, 2)).unwrap();
        assert_eq!(w.x_start, 0);
        assert_eq!(w.x_end, 15);
        assert_eq!(w.bytes_per_row(), 2);
        assert_eq!(w.to_region(), Region::new(0, 10, 16, 2));
    }

    #[test]
    fn test_aligned_region_round_trips() {
        let region = Region::new(16, 300, 24, 100);
        let w = PartialWindow::for_region(region).unwrap();
        assert_eq!(PartialWindow::decode(&w.encode()), w);
        assert_eq!(w.to_region(), region);
    }

    #[test]
    fn test_rejects_empty_and_outside() {
        assert!(PartialWindow::for_region(Region::new(0, 0, 0, 1)).is_none());
        assert!(PartialWindow::for_region(Region::new(0, 0, 8, 417)).is_none());
        assert!(PartialWindow::for_region(Region::new(236, 0, 8, 1)).is_none());
    }
}
