//! Display engine for the GDEW0371W7 badge panel
//!
//! Everything between badge screens and the SPI bus: the two-plane
//! framebuffer, the compositor, text and bitmap rasterization, and the
//! UC8171 refresh protocol.

// Logging macros must be declared before the modules that use them.
#[macro_use]
mod fmt;

pub mod bitmap;
pub mod compositor;
pub mod driver;
mod error;
pub mod ext;
pub mod font;
pub mod gray;
pub mod image;
pub mod lut;
pub mod manager;
pub mod planes;
pub mod text;
pub mod transfer;
pub mod window;

pub use compositor::{composite, CompositeMode};
pub use driver::{Command, Gdew0371w7, PowerState, RefreshSession};
pub use error::DisplayError;
pub use ext::PanelExt;
pub use font::{Font, FontSet, Glyph};
pub use gray::{Color, GrayLevel};
pub use image::{ImageKind, RenderedImage};
pub use manager::DisplayManager;
pub use planes::{ink_to_panel, PlaneStore, BACKGROUND, BACKGROUND_BYTE, INK, INK_BYTE};
pub use window::PartialWindow;

use eink_specs::displays::GDEW0371W7;
use platform::PanelTiming;

/// Panel description for the badge display.
pub const GDEW0371W7_SPEC: eink_specs::DisplaySpec = GDEW0371W7;

/// Display width in pixels (GDEW0371W7)
pub const DISPLAY_WIDTH: u16 = GDEW0371W7.width as u16;

/// Display height in pixels (GDEW0371W7)
pub const DISPLAY_HEIGHT: u16 = GDEW0371W7.height as u16;

/// Bytes per packed plane (240×416 at 1 bit per pixel = 12 480 bytes).
pub const PLANE_BYTES: usize = GDEW0371W7.plane_bytes();

/// Bytes per plane row (30).
pub const ROW_STRIDE: usize = GDEW0371W7.row_stride_bytes();

/// Protocol timing with the busy budget sized for `temp_celsius`.
///
/// The budget is twice the temperature-adjusted full refresh time. Outside
/// the panel's operating window the waveforms are not tuned, so the budget
/// is still computed but a warning is logged.
pub fn timing_for_temperature(temp_celsius: i8) -> PanelTiming {
    if !GDEW0371W7.is_operating_temp(temp_celsius) {
        warn!(
            "{} C is outside the {}..={} C operating window",
            temp_celsius,
            GDEW0371W7.temp_operating_min,
            GDEW0371W7.temp_operating_max
        );
    }
    let refresh_ms = GDEW0371W7.adjusted_refresh_ms(GDEW0371W7.full_refresh_ms, temp_celsius);
    PanelTiming::gdew0371w7().for_refresh_budget(refresh_ms.saturating_mul(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_constants() {
        assert_eq!(DISPLAY_WIDTH, 240);
        assert_eq!(DISPLAY_HEIGHT, 416);
        assert_eq!(PLANE_BYTES, 12_480);
        assert_eq!(ROW_STRIDE, 30);
    }

    #[test]
    fn test_room_temperature_timing_matches_reference() {
        assert_eq!(timing_for_temperature(20), PanelTiming::gdew0371w7());
    }

    #[test]
    fn test_out_of_window_temperature_still_gets_a_budget() {
        assert!(!GDEW0371W7_SPEC.is_operating_temp(-10));
        let frozen = timing_for_temperature(-10);
        assert!(frozen.max_busy_polls >= 1);
        assert!(frozen.busy_budget_ms() >= GDEW0371W7_SPEC.full_refresh_ms.saturating_mul(2));
    }

    #[test]
    fn test_cold_panel_gets_longer_budget() {
        let cold = timing_for_temperature(-10);
        assert!(cold.busy_budget_ms() > PanelTiming::gdew0371w7().busy_budget_ms());
    }
}
