//! Display manager
//!
//! The facade badge screens draw through. It owns the plane store, the
//! panel driver, the asset storage and the fonts, so every operation takes
//! `&mut self` and no buffer is shared.
//!
//! A screen is built in two steps:
//!
//! ```text
//! clear_display_buffers → write_* (compose into planes) → render_full_display
//! ```
//!
//! Short status updates can skip the planes and draw text straight to the
//! panel with `start_text_to_screen` / `write_text_to_screen` /
//! `update_text_to_screen`.

use alloc::vec::Vec;

use platform::config::{ERROR_FONT, ERROR_MESSAGE_Y, RESET_PROMPT, RESET_PROMPT_Y};
use platform::{PanelDriver, PlaneKind, Region, Storage, Waveform};

use super::bitmap;
use super::compositor::{composite, CompositeMode};
use super::font::FontSet;
use super::image::{ImageKind, RenderedImage};
use super::planes::{PlaneStore, INK_BYTE};
use super::text::{self, fit_to_width};
use super::transfer::{fill_row, window_bytes};
use super::{DisplayError, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Owner of the planes, the panel and the assets.
pub struct DisplayManager<P, S> {
    panel: P,
    storage: S,
    planes: PlaneStore,
    fonts: FontSet,
}

impl<P, S> DisplayManager<P, S>
where
    P: PanelDriver,
    P::DriverError: Into<DisplayError>,
    S: Storage,
{
    /// Manager with the built-in fonts and cleared planes.
    pub fn new(panel: P, storage: S) -> Result<Self, DisplayError> {
        Ok(Self::with_fonts(panel, storage, FontSet::builtin()?))
    }

    /// Manager with a custom font set.
    pub fn with_fonts(panel: P, storage: S, fonts: FontSet) -> Self {
        Self {
            panel,
            storage,
            planes: PlaneStore::new(),
            fonts,
        }
    }

    /// The composed planes.
    pub fn planes(&self) -> &PlaneStore {
        &self.planes
    }

    /// The panel driver.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Mutable access to the panel driver, e.g. for [`PanelExt`](super::PanelExt) fills.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// The font set.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    // -----------------------------------------------------------------------
    // Composition
    // -----------------------------------------------------------------------

    /// Reset both planes to background.
    pub fn clear_display_buffers(&mut self) {
        self.planes.clear();
    }

    /// Decode the BMP `name` and composite it with its top-left corner at
    /// `(x, y)`.
    pub fn write_image_to_buffer(
        &mut self,
        name: &str,
        x: u16,
        y: u16,
        transparent: bool,
    ) -> Result<(), DisplayError> {
        let bytes = self.load_asset(name)?;
        let image = bitmap::decode(&bytes).map_err(|e| {
            warn!("asset {} rejected: {}", name, e);
            e
        })?;
        composite(
            &mut self.planes,
            &image,
            x,
            y,
            CompositeMode::from_transparent(transparent),
        )
    }

    /// Replace both planes with the full-screen BMP `name`.
    pub fn write_background(&mut self, name: &str) -> Result<ImageKind, DisplayError> {
        let bytes = self.load_asset(name)?;
        bitmap::decode_into_planes(&bytes, &mut self.planes).map_err(|e| {
            warn!("background {} rejected: {}", name, e);
            e
        })
    }

    /// Rasterize `text` in font `font` and composite it at `(x, y)`.
    pub fn write_text_to_buffer(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        font: u8,
        transparent: bool,
    ) -> Result<(), DisplayError> {
        let image = text::rasterize(text.as_bytes(), self.fonts.get(font)?, true)?;
        composite(
            &mut self.planes,
            &image,
            x,
            y,
            CompositeMode::from_transparent(transparent),
        )
    }

    /// [`write_text_to_buffer`](Self::write_text_to_buffer) horizontally
    /// centered on the sum of the glyph advances.
    pub fn write_centered_message(
        &mut self,
        text: &str,
        y: u16,
        font: u8,
        transparent: bool,
    ) -> Result<(), DisplayError> {
        let advance = fit_to_width(text.as_bytes(), self.fonts.get(font)?)?
            .iter()
            .fold(0u16, |sum, g| sum.saturating_add(u16::from(g.advance)));
        let x = DISPLAY_WIDTH.saturating_sub(advance) / 2;
        self.write_text_to_buffer(text, x, y, font, transparent)
    }

    /// One-pixel ink line from `(x, y)`, `width` pixels long.
    pub fn write_horizontal_separator(&mut self, x: u16, y: u16, width: u16) -> Result<(), DisplayError> {
        self.write_rectangle_filled(Region::new(x, y, width, 1))
    }

    /// Ink `region`. Pixels that share a byte with its edges keep their
    /// current value.
    pub fn write_rectangle_filled(&mut self, region: Region) -> Result<(), DisplayError> {
        if region.is_empty() {
            return Ok(());
        }
        if !region.fits_within(DISPLAY_WIDTH, DISPLAY_HEIGHT) {
            return Err(DisplayError::OutOfBounds);
        }
        let row_bytes = window_bytes(region.x, region.width);
        let len = row_bytes
            .checked_mul(usize::from(region.height))
            .ok_or(DisplayError::OutOfBounds)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| DisplayError::Capacity)?;
        data.resize(len, 0);
        for row in data.chunks_exact_mut(row_bytes) {
            fill_row(INK_BYTE, region.x, region.width, row)?;
        }
        let width = u16::try_from(row_bytes.saturating_mul(8)).map_err(|_| DisplayError::OutOfBounds)?;
        let image = RenderedImage::monochrome(width, region.height, data)?;
        composite(
            &mut self.planes,
            &image,
            region.x,
            region.y,
            CompositeMode::Transparent,
        )
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Flush the planes and refresh the panel.
    ///
    /// `Grayscale` streams `old` then `new` through the grayscale LUT;
    /// `Monochrome` streams only `new` through the partial LUT. The panel
    /// is put to sleep afterwards, and also when the flush fails.
    pub fn render_full_display(&mut self, kind: ImageKind) -> Result<(), DisplayError> {
        info!("render {} start", kind);
        match self.flush(kind) {
            Ok(()) => {
                info!("render {} done", kind);
                Ok(())
            }
            Err(e) => {
                error!("render {} failed: {}", kind, e);
                if self.panel.sleep().is_err() {
                    warn!("panel did not enter sleep after failed render");
                }
                Err(e)
            }
        }
    }

    fn flush(&mut self, kind: ImageKind) -> Result<(), DisplayError> {
        self.panel.power_on().map_err(Into::into)?;
        match kind {
            ImageKind::Grayscale => {
                self.panel.load_waveform(Waveform::Grayscale).map_err(Into::into)?;
                self.stream_plane(PlaneKind::Old)?;
                self.stream_plane(PlaneKind::New)?;
            }
            ImageKind::Monochrome => {
                self.panel.load_waveform(Waveform::Partial).map_err(Into::into)?;
                self.stream_plane(PlaneKind::New)?;
            }
        }
        self.panel.refresh().map_err(Into::into)?;
        self.panel.sleep().map_err(Into::into)
    }

    /// Send every memory row as a one-row window at its screen row.
    fn stream_plane(&mut self, kind: PlaneKind) -> Result<(), DisplayError> {
        for memory_row in 0..DISPLAY_HEIGHT {
            let row = self
                .planes
                .row(kind, memory_row)
                .ok_or(DisplayError::OutOfBounds)?;
            let screen_row = DISPLAY_HEIGHT
                .checked_sub(memory_row)
                .and_then(|r| r.checked_sub(1))
                .ok_or(DisplayError::OutOfBounds)?;
            let region = Region::new(0, screen_row, DISPLAY_WIDTH, 1);
            self.panel.write_rows(kind, region, row).map_err(Into::into)?;
        }
        trace!("{} plane streamed", kind);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Direct-to-screen text
    // -----------------------------------------------------------------------

    /// Wake the panel for direct text drawing with the partial LUT.
    pub fn start_text_to_screen(&mut self) -> Result<(), DisplayError> {
        self.panel.power_on().map_err(Into::into)?;
        self.panel.load_waveform(Waveform::Partial).map_err(Into::into)
    }

    /// Draw `text` straight into the panel's `new` plane at `(x, y)`,
    /// bypassing the plane store.
    pub fn write_text_to_screen(&mut self, text: &str, x: u16, y: u16, font: u8) -> Result<(), DisplayError> {
        let image = text::rasterize(text.as_bytes(), self.fonts.get(font)?, false)?;
        if image.is_empty() {
            return Ok(());
        }
        let region = Region::new(x, y, image.width(), image.height());
        self.panel
            .write_rows(PlaneKind::New, region, image.plane(PlaneKind::New))
            .map_err(Into::into)
    }

    /// Show what [`write_text_to_screen`](Self::write_text_to_screen) drew,
    /// then sleep.
    pub fn update_text_to_screen(&mut self) -> Result<(), DisplayError> {
        self.panel.refresh().map_err(Into::into)?;
        self.panel.sleep().map_err(Into::into)
    }

    // -----------------------------------------------------------------------
    // Fatal error screen
    // -----------------------------------------------------------------------

    /// Replace the screen with `message` and the reset prompt.
    pub fn render_error_message(&mut self, message: &str) -> Result<(), DisplayError> {
        error!("fatal: {}", message);
        self.clear_display_buffers();
        self.write_centered_message(message, ERROR_MESSAGE_Y, ERROR_FONT, false)?;
        self.write_centered_message(RESET_PROMPT, RESET_PROMPT_Y, ERROR_FONT, true)?;
        self.render_full_display(ImageKind::Grayscale)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    fn load_asset(&mut self, name: &str) -> Result<Vec<u8>, DisplayError> {
        let size = self.storage.file_size(name).map_err(|_| {
            warn!("asset {} unavailable", name);
            DisplayError::AssetUnavailable
        })?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| DisplayError::Capacity)?;
        bytes.resize(size, 0);
        let read = self.storage.read_file(name, &mut bytes).map_err(|_| {
            warn!("asset {} could not be read", name);
            DisplayError::AssetUnavailable
        })?;
        bytes.truncate(read);
        debug!("asset {} loaded, {} bytes", name, read);
        Ok(bytes)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::display::planes::BACKGROUND_BYTE;
    use platform::mocks::{MemoryStorage, MockPanel, PanelOp};
    use platform::PanelError;

    type TestManager = DisplayManager<MockPanel, MemoryStorage>;

    fn manager() -> TestManager {
        DisplayManager::new(MockPanel::new(240, 416), MemoryStorage::new()).unwrap()
    }

    fn writes(m: &TestManager) -> Vec<(PlaneKind, Region)> {
        m.panel()
            .ops()
            .iter()
            .filter_map(|op| match op {
                PanelOp::WriteRows { plane, region, .. } => Some((*plane, *region)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_monochrome_render_streams_new_plane() {
        let mut m = manager();
        m.render_full_display(ImageKind::Monochrome).unwrap();
        let ops = m.panel().ops();
        assert_eq!(ops[0], PanelOp::PowerOn);
        assert_eq!(ops[1], PanelOp::LoadWaveform(Waveform::Partial));
        assert_eq!(ops[ops.len() - 2], PanelOp::Refresh);
        assert_eq!(ops[ops.len() - 1], PanelOp::Sleep);

        let rows = writes(&m);
        assert_eq!(rows.len(), 416);
        assert!(rows.iter().all(|(p, _)| *p == PlaneKind::New));
        // Memory row 0 is the bottom screen row.
        assert_eq!(rows[0].1, Region::new(0, 415, 240, 1));
        assert_eq!(rows[415].1, Region::new(0, 0, 240, 1));
    }

    #[test]
    fn test_grayscale_render_streams_old_then_new() {
        let mut m = manager();
        m.render_full_display(ImageKind::Grayscale).unwrap();
        let rows = writes(&m);
        assert_eq!(rows.len(), 832);
        assert!(rows[..416].iter().all(|(p, _)| *p == PlaneKind::Old));
        assert!(rows[416..].iter().all(|(p, _)| *p == PlaneKind::New));
        assert!(m
            .panel()
            .ops()
            .contains(&PanelOp::LoadWaveform(Waveform::Grayscale)));
    }

    #[test]
    fn test_failed_refresh_still_sleeps() {
        let mut panel = MockPanel::new(240, 416);
        panel.fail_refresh_with(PanelError::Timeout);
        let mut m = DisplayManager::new(panel, MemoryStorage::new()).unwrap();
        assert_eq!(
            m.render_full_display(ImageKind::Monochrome),
            Err(DisplayError::ProtocolTimeout)
        );
        assert_eq!(m.panel().ops().last(), Some(&PanelOp::Sleep));
    }

    #[test]
    fn test_centered_message_is_centered() {
        let mut m = manager();
        // "Hi": two 8-px advances, centered at x = 112.
        m.write_centered_message("Hi", 100, 0, false).unwrap();
        let inked: Vec<u16> = (0..240)
            .filter(|x| (100..130).any(|y| m.planes().is_ink(PlaneKind::New, *x, y) == Some(true)))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|x| (112..128).contains(x)));
    }

    #[test]
    fn test_unknown_font() {
        let mut m = manager();
        assert_eq!(
            m.write_text_to_buffer("x", 0, 0, 3, false),
            Err(DisplayError::UnknownFont)
        );
    }

    #[test]
    fn test_separator_and_rectangle_ink_exact_pixels() {
        let mut m = manager();
        m.write_horizontal_separator(5, 50, 10).unwrap();
        let p = m.planes();
        assert_eq!(p.is_ink(PlaneKind::New, 4, 50), Some(false));
        assert_eq!(p.is_ink(PlaneKind::New, 5, 50), Some(true));
        assert_eq!(p.is_ink(PlaneKind::New, 14, 50), Some(true));
        assert_eq!(p.is_ink(PlaneKind::New, 15, 50), Some(false));
        assert_eq!(p.is_ink(PlaneKind::Old, 10, 50), Some(true));
        assert_eq!(p.is_ink(PlaneKind::New, 10, 51), Some(false));

        m.write_rectangle_filled(Region::new(0, 0, 16, 4)).unwrap();
        assert_eq!(m.planes().is_ink(PlaneKind::New, 15, 3), Some(true));
        assert_eq!(
            m.write_rectangle_filled(Region::new(230, 0, 16, 1)),
            Err(DisplayError::OutOfBounds)
        );
    }

    #[test]
    fn test_missing_asset() {
        let mut m = manager();
        assert_eq!(
            m.write_image_to_buffer("nope.bmp", 0, 0, false),
            Err(DisplayError::AssetUnavailable)
        );
        assert_eq!(m.write_background("nope.bmp"), Err(DisplayError::AssetUnavailable));
    }

    #[test]
    fn test_direct_text_goes_to_panel() {
        let mut m = manager();
        m.start_text_to_screen().unwrap();
        m.write_text_to_screen("OK", 16, 20, 2).unwrap();
        m.update_text_to_screen().unwrap();

        let ops = m.panel().ops();
        let PanelOp::WriteRows { plane, region, rows } = &ops[2] else {
            panic!("expected a row write, got {:?}", ops[2]);
        };
        assert_eq!(*plane, PlaneKind::New);
        assert_eq!((region.x, region.y, region.width), (16, 20, 16));
        assert_eq!(rows.len(), usize::from(region.height) * 2);
        assert_eq!(&ops[3..], &[PanelOp::Refresh, PanelOp::Sleep]);
        // Planes are untouched.
        assert!(m.planes().plane(PlaneKind::New).iter().all(|b| *b == BACKGROUND_BYTE));
    }

    #[test]
    fn test_error_screen() {
        let mut m = manager();
        m.write_rectangle_filled(Region::new(0, 0, 240, 8)).unwrap();
        m.render_error_message("SD card missing").unwrap();
        // Old content was cleared.
        assert_eq!(m.planes().is_ink(PlaneKind::New, 0, 0), Some(false));
        // Both lines were drawn.
        let line = |y: u16| (0..240).any(|x| m.planes().is_ink(PlaneKind::New, x, y) == Some(true));
        assert!((ERROR_MESSAGE_Y..ERROR_MESSAGE_Y + 20).any(line));
        assert!((RESET_PROMPT_Y..RESET_PROMPT_Y + 20).any(line));
        assert_eq!(m.panel().refresh_count(), 1);
    }
}
