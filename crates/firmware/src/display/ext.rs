//! Solid-color drawing straight to the panel
//!
//! These helpers bypass the plane store: they program a window and stream
//! fill bytes, so they are the cheap way to blank or mark an area before a
//! refresh. The caller still triggers [`PanelDriver::refresh`].

use platform::{PanelDriver, PlaneKind, Region};

use super::gray::Color;
use super::planes::{BACKGROUND_BYTE, INK_BYTE};

/// Fill operations available on every [`PanelDriver`].
pub trait PanelExt: PanelDriver {
    /// Fill `region` with `color`.
    ///
    /// Bi-level colors load the partial waveform and write the `new` plane;
    /// gray levels load the grayscale waveform and write `old` then `new`.
    fn fill_color(&mut self, region: Region, color: Color) -> Result<(), Self::DriverError> {
        self.power_on()?;
        self.load_waveform(color.waveform())?;
        match color {
            Color::BwBlack => self.fill_region(PlaneKind::New, region, INK_BYTE),
            Color::BwWhite => self.fill_region(PlaneKind::New, region, BACKGROUND_BYTE),
            Color::Gray(level) => {
                let (old, new) = level.plane_bytes();
                self.fill_region(PlaneKind::Old, region, old)?;
                self.fill_region(PlaneKind::New, region, new)
            }
        }
    }

    /// Set one pixel.
    fn draw_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), Self::DriverError> {
        self.fill_color(Region::new(x, y, 1, 1), color)
    }

    /// Horizontal line `length` pixels long starting at `(x, y)`.
    fn draw_hline(&mut self, x: u16, y: u16, length: u16, color: Color) -> Result<(), Self::DriverError> {
        self.fill_color(Region::new(x, y, length, 1), color)
    }

    /// Vertical line `length` pixels long starting at `(x, y)`.
    fn draw_vline(&mut self, x: u16, y: u16, length: u16, color: Color) -> Result<(), Self::DriverError> {
        self.fill_color(Region::new(x, y, 1, length), color)
    }

    /// Line between two points, both included, in either order.
    ///
    /// Only horizontal and vertical lines are drawn; a diagonal is a no-op.
    fn draw_line(
        &mut self,
        (x1, y1): (u16, u16),
        (x2, y2): (u16, u16),
        color: Color,
    ) -> Result<(), Self::DriverError> {
        if y1 == y2 {
            self.draw_hline(x1.min(x2), y1, x1.abs_diff(x2).saturating_add(1), color)
        } else if x1 == x2 {
            self.draw_vline(x1, y1.min(y2), y1.abs_diff(y2).saturating_add(1), color)
        } else {
            Ok(())
        }
    }

    /// Filled `region`, or its one-pixel outline.
    ///
    /// The outline stays inside `region`: top and bottom rows span the full
    /// width, the side columns fill the rows between them.
    fn draw_rectangle(&mut self, region: Region, color: Color, filled: bool) -> Result<(), Self::DriverError> {
        if filled || region.width <= 2 || region.height <= 2 {
            return self.fill_color(region, color);
        }
        let Region { x, y, width, height } = region;
        let right = x.saturating_add(width).saturating_sub(1);
        let bottom = y.saturating_add(height).saturating_sub(1);
        let sides = height.saturating_sub(2);
        self.draw_hline(x, y, width, color)?;
        self.draw_hline(x, bottom, width, color)?;
        self.draw_vline(x, y.saturating_add(1), sides, color)?;
        self.draw_vline(right, y.saturating_add(1), sides, color)
    }

    /// Paint `region` white.
    fn clear_region(&mut self, region: Region) -> Result<(), Self::DriverError> {
        self.fill_color(region, Color::BwWhite)
    }

    /// Paint both controller planes white over the whole panel.
    fn clear_panel(&mut self) -> Result<(), Self::DriverError> {
        let info = self.info();
        let full = Region::full(info.width, info.height);
        self.power_on()?;
        self.load_waveform(Color::BwWhite.waveform())?;
        self.fill_region(PlaneKind::Old, full, BACKGROUND_BYTE)?;
        self.fill_region(PlaneKind::New, full, BACKGROUND_BYTE)
    }
}

impl<P: PanelDriver + ?Sized> PanelExt for P {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::display::gray::GrayLevel;
    use platform::mocks::{MockPanel, PanelOp};
    use platform::{PanelError, Waveform};

    #[test]
    fn test_bw_fill_writes_new_plane_only() {
        let mut panel = MockPanel::new(240, 416);
        let region = Region::new(3, 4, 10, 2);
        panel.fill_color(region, Color::BwBlack).unwrap();
        assert_eq!(
            panel.ops(),
            &[
                PanelOp::PowerOn,
                PanelOp::LoadWaveform(Waveform::Partial),
                PanelOp::Fill {
                    plane: PlaneKind::New,
                    region,
                    value: 0x00
                },
            ]
        );
    }

    #[test]
    fn test_gray_fill_writes_both_planes() {
        let mut panel = MockPanel::new(240, 416);
        let region = Region::new(0, 0, 8, 8);
        panel
            .fill_color(region, Color::Gray(GrayLevel::DarkGray))
            .unwrap();
        assert_eq!(
            &panel.ops()[1..],
            &[
                PanelOp::LoadWaveform(Waveform::Grayscale),
                PanelOp::Fill {
                    plane: PlaneKind::Old,
                    region,
                    value: 0xFF
                },
                PanelOp::Fill {
                    plane: PlaneKind::New,
                    region,
                    value: 0x00
                },
            ]
        );
    }

    #[test]
    fn test_pixel_is_a_one_by_one_fill() {
        let mut panel = MockPanel::new(240, 416);
        panel.draw_pixel(17, 33, Color::BwBlack).unwrap();
        assert!(panel.ops().contains(&PanelOp::Fill {
            plane: PlaneKind::New,
            region: Region::new(17, 33, 1, 1),
            value: 0x00,
        }));
        assert_eq!(
            panel.draw_pixel(240, 0, Color::BwBlack),
            Err(PanelError::InvalidRegion)
        );
    }

    #[test]
    fn test_clear_panel_whitens_both_planes() {
        let mut panel = MockPanel::new(240, 416);
        panel.clear_panel().unwrap();
        let fills: Vec<_> = panel
            .ops()
            .iter()
            .filter_map(|op| match op {
                PanelOp::Fill { plane, region, value } => Some((*plane, *region, *value)),
                _ => None,
            })
            .collect();
        assert_eq!(
            fills,
            vec![
                (PlaneKind::Old, Region::full(240, 416), 0xFF),
                (PlaneKind::New, Region::full(240, 416), 0xFF),
            ]
        );
    }

    fn fills(panel: &MockPanel) -> Vec<(PlaneKind, Region, u8)> {
        panel
            .ops()
            .iter()
            .filter_map(|op| match op {
                PanelOp::Fill { plane, region, value } => Some((*plane, *region, *value)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lines_are_one_pixel_fills() {
        let mut panel = MockPanel::new(240, 416);
        panel.draw_hline(10, 20, 30, Color::BwBlack).unwrap();
        panel.draw_vline(5, 6, 7, Color::BwWhite).unwrap();
        assert_eq!(
            fills(&panel),
            vec![
                (PlaneKind::New, Region::new(10, 20, 30, 1), 0x00),
                (PlaneKind::New, Region::new(5, 6, 1, 7), 0xFF),
            ]
        );
    }

    #[test]
    fn test_line_endpoints_in_any_order() {
        let mut panel = MockPanel::new(240, 416);
        panel.draw_line((40, 9), (10, 9), Color::BwBlack).unwrap();
        panel.draw_line((3, 50), (3, 20), Color::BwBlack).unwrap();
        assert_eq!(
            fills(&panel),
            vec![
                (PlaneKind::New, Region::new(10, 9, 31, 1), 0x00),
                (PlaneKind::New, Region::new(3, 20, 1, 31), 0x00),
            ]
        );
    }

    #[test]
    fn test_diagonal_line_draws_nothing() {
        let mut panel = MockPanel::new(240, 416);
        panel.draw_line((0, 0), (10, 10), Color::BwBlack).unwrap();
        assert!(panel.ops().is_empty());
    }

    #[test]
    fn test_rectangle_outline_is_four_edges() {
        let mut panel = MockPanel::new(240, 416);
        panel
            .draw_rectangle(Region::new(8, 16, 24, 10), Color::BwBlack, false)
            .unwrap();
        assert_eq!(
            fills(&panel),
            vec![
                (PlaneKind::New, Region::new(8, 16, 24, 1), 0x00),
                (PlaneKind::New, Region::new(8, 25, 24, 1), 0x00),
                (PlaneKind::New, Region::new(8, 17, 1, 8), 0x00),
                (PlaneKind::New, Region::new(31, 17, 1, 8), 0x00),
            ]
        );
    }

    #[test]
    fn test_filled_rectangle_is_one_fill() {
        let mut panel = MockPanel::new(240, 416);
        let region = Region::new(8, 16, 24, 10);
        panel.draw_rectangle(region, Color::BwWhite, true).unwrap();
        assert_eq!(fills(&panel), vec![(PlaneKind::New, region, 0xFF)]);

        let mut thin = MockPanel::new(240, 416);
        let line = Region::new(0, 0, 240, 2);
        thin.draw_rectangle(line, Color::BwBlack, false).unwrap();
        assert_eq!(fills(&thin), vec![(PlaneKind::New, line, 0x00)]);
    }

    #[test]
    fn test_rectangle_past_edge_is_rejected() {
        let mut panel = MockPanel::new(240, 416);
        assert_eq!(
            panel.draw_rectangle(Region::new(230, 0, 16, 16), Color::BwBlack, false),
            Err(PanelError::InvalidRegion)
        );
    }

    #[test]
    fn test_clear_region_is_white() {
        let mut panel = MockPanel::new(240, 416);
        panel.clear_region(Region::new(0, 0, 16, 16)).unwrap();
        assert!(matches!(
            panel.ops().last(),
            Some(PanelOp::Fill { value: 0xFF, .. })
        ));
    }
}
