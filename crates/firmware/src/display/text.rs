//! Text rasterizer
//!
//! Renders a byte string into a packed monochrome [`RenderedImage`].
//!
//! The image is `text_offset + max_height` rows tall, where `text_offset`
//! is `max(0, max(h + y_offset))`, the deepest glyph bottom below the
//! baseline. Glyph row `j` lands on matrix row
//! `text_offset - y_offset - 1 - j`, which puts the top of the text at the
//! highest matrix row: matrix row 0 is the bottom of the image.
//!
//! - `flip = true` keeps that bottom-up order, as the compositor expects.
//! - `flip = false` mirrors the matrix into upright rows for streaming
//!   straight to the panel.
//!
//! Characters are dropped from the end when the advances would pass the
//! panel width; characters the font lacks render as `?` (or are skipped if
//! the font has no `?`).

use alloc::vec::Vec;

use super::font::{Font, Glyph};
use super::image::RenderedImage;
use super::planes::ink_to_panel;
use super::{DisplayError, DISPLAY_WIDTH};

/// Size of the image [`rasterize`] produces for a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    /// Sum of advances rounded up to a multiple of 8
    pub width: u16,
    /// `max_height + text_offset`
    pub height: u16,
    /// Rows reserved below the topmost glyph bottom
    pub text_offset: u16,
}

impl TextMetrics {
    fn measure(glyphs: &[&Glyph]) -> Result<Self, DisplayError> {
        let advance = glyphs
            .iter()
            .fold(0u32, |sum, g| sum.saturating_add(u32::from(g.advance)));
        let width = u16::try_from(advance.div_ceil(8).saturating_mul(8))
            .map_err(|_| DisplayError::InvalidAsset)?;
        let max_height = glyphs.iter().map(|g| u16::from(g.height)).max().unwrap_or(0);
        let text_offset = glyphs
            .iter()
            .map(|g| i16::from(g.height).saturating_add(i16::from(g.y_offset)))
            .max()
            .unwrap_or(0)
            .max(0);
        let text_offset = u16::try_from(text_offset).map_err(|_| DisplayError::InvalidAsset)?;
        Ok(Self {
            width,
            height: max_height.saturating_add(text_offset),
            text_offset,
        })
    }
}

/// Glyphs of `text` that fit on one panel line.
///
/// At the first character whose advance would pass the panel width, the
/// characters before the previous one are kept.
pub fn fit_to_width<'f>(text: &[u8], font: &'f Font) -> Result<Vec<&'f Glyph>, DisplayError> {
    let mut glyphs = Vec::new();
    glyphs
        .try_reserve_exact(text.len())
        .map_err(|_| DisplayError::Capacity)?;

    let mut sum = 0u32;
    for glyph in text.iter().filter_map(|c| font.glyph_or_fallback(*c)) {
        let next = sum.saturating_add(u32::from(glyph.advance));
        if next > u32::from(DISPLAY_WIDTH) {
            glyphs.truncate(glyphs.len().saturating_sub(1));
            break;
        }
        glyphs.push(glyph);
        sum = next;
    }
    Ok(glyphs)
}

/// Metrics of `text` after fitting it to the panel width.
pub fn measure(text: &[u8], font: &Font) -> Result<TextMetrics, DisplayError> {
    TextMetrics::measure(&fit_to_width(text, font)?)
}

/// Rasterize `text` in `font`. See the module docs for row order.
pub fn rasterize(text: &[u8], font: &Font, flip: bool) -> Result<RenderedImage, DisplayError> {
    let glyphs = fit_to_width(text, font)?;
    let metrics = TextMetrics::measure(&glyphs)?;
    let width = usize::from(metrics.width);
    let height = usize::from(metrics.height);

    let mut matrix = InkMatrix::new(width, height)?;
    let mut column = 0usize;
    for glyph in &glyphs {
        matrix.place(font, glyph, column, metrics.text_offset)?;
        column = column.saturating_add(usize::from(glyph.advance));
    }
    if !flip {
        matrix.mirror_rows()?;
    }

    let packed = matrix.pack()?;
    RenderedImage::monochrome(metrics.width, metrics.height, packed)
}

/// `height × width` ink flags, row-major, `true` = ink.
struct InkMatrix {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl InkMatrix {
    fn new(width: usize, height: usize) -> Result<Self, DisplayError> {
        let len = width.checked_mul(height).ok_or(DisplayError::Capacity)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| DisplayError::Capacity)?;
        cells.resize(len, false);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    fn place(
        &mut self,
        font: &Font,
        glyph: &Glyph,
        column: usize,
        text_offset: u16,
    ) -> Result<(), DisplayError> {
        // Topmost glyph row sits at text_offset - y_offset - 1.
        let top = i32::from(text_offset)
            .saturating_sub(i32::from(glyph.y_offset))
            .saturating_sub(1);
        for j in 0..glyph.height {
            let row = usize::try_from(top.saturating_sub(i32::from(j)))
                .map_err(|_| DisplayError::InvalidAsset)?;
            if row >= self.height {
                return Err(DisplayError::InvalidAsset);
            }
            for c in 0..glyph.width {
                if !font.glyph_pixel(glyph, c, j) {
                    continue;
                }
                let col = column.saturating_add(usize::from(c));
                if col >= self.width {
                    return Err(DisplayError::InvalidAsset);
                }
                let index = row.saturating_mul(self.width).saturating_add(col);
                let cell = self.cells.get_mut(index).ok_or(DisplayError::InvalidAsset)?;
                *cell = true;
            }
        }
        Ok(())
    }

    fn mirror_rows(&mut self) -> Result<(), DisplayError> {
        let mut mirrored = Vec::new();
        mirrored
            .try_reserve_exact(self.cells.len())
            .map_err(|_| DisplayError::Capacity)?;
        for row in self.cells.chunks(self.width.max(1)).rev() {
            mirrored.extend_from_slice(row);
        }
        self.cells = mirrored;
        Ok(())
    }

    /// Pack MSB-first, then convert ink flags to panel polarity.
    fn pack(&self) -> Result<Vec<u8>, DisplayError> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.cells.len() / 8)
            .map_err(|_| DisplayError::Capacity)?;
        for byte_cells in self.cells.chunks(8) {
            let ink_mask = byte_cells
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, on)| if *on { acc | (0x80 >> bit) } else { acc });
            out.push(ink_to_panel(ink_mask));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::display::font::FontSet;
    use alloc::vec;
    use platform::PlaneKind;

    /// 'A' is a 2×2 block sitting on the baseline, 'G' a 1×3 stroke with
    /// one row below it; every advance is 10 except 'W' (18).
    fn test_font() -> Font {
        let mut glyphs = vec![Glyph::default(); 26];
        glyphs[0] = Glyph {
            width: 2,
            height: 2,
            advance: 10,
            y_offset: -2,
            bitmap_offset: 0,
        };
        for g in glyphs.iter_mut().skip(1) {
            g.advance = 10;
            g.bitmap_offset = 1;
        }
        glyphs[usize::from(b'W' - b'A')].advance = 18;
        glyphs[usize::from(b'G' - b'A')] = Glyph {
            width: 1,
            height: 3,
            advance: 10,
            y_offset: -2,
            bitmap_offset: 1,
        };
        Font::new(b'A', &glyphs, vec![0b1111_0000, 0b1110_0000]).unwrap()
    }

    fn unpack(img: &RenderedImage) -> Vec<Vec<bool>> {
        img.plane(PlaneKind::New)
            .chunks(img.row_bytes())
            .map(|row| {
                row.iter()
                    .flat_map(|b| (0..8).map(move |i| (b >> (7 - i)) & 1 == 0))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_metrics_include_descender_rows() {
        let font = test_font();
        let m = measure(b"AG", &font).unwrap();
        assert_eq!(m.width, 24);
        // max(h + yo) = 1 ('G'), max height 3
        assert_eq!(m.text_offset, 1);
        assert_eq!(m.height, 4);
    }

    #[test]
    fn test_flipped_image_is_bottom_up() {
        let font = test_font();
        let img = rasterize(b"A", &font, true).unwrap();
        assert_eq!((img.width(), img.height()), (16, 2));
        let rows = unpack(&img);
        // Row 0 is the bottom of the glyph.
        assert_eq!(&rows[0][..3], &[true, true, false]);
        assert_eq!(&rows[1][..3], &[true, true, false]);
    }

    #[test]
    fn test_upright_image_mirrors_flipped() {
        let font = test_font();
        let flipped = unpack(&rasterize(b"AG", &font, true).unwrap());
        let mut upright = unpack(&rasterize(b"AG", &font, false).unwrap());
        upright.reverse();
        assert_eq!(flipped, upright);
    }

    #[test]
    fn test_descender_sits_below_baseline() {
        let font = test_font();
        let rows = unpack(&rasterize(b"AG", &font, false).unwrap());
        // Upright: rows 0..=1 hold 'A' and the top of 'G', row 3 is blank
        // under 'A' but inked under 'G'.
        assert!(rows[1][0] && rows[2][0]);
        assert!(!rows[3][0]);
        assert!(rows[3][10]);
    }

    #[test]
    fn test_truncation_keeps_line_within_panel() {
        let font = test_font();
        // 23 × 10 + 18 = 248 > 240
        let text = b"ABCDEFGHIJKLMNOPQRSTUVX";
        assert_eq!(text.len(), 23);
        let mut long = text.to_vec();
        long.push(b'W');
        assert_eq!(font.text_advance(&long), 248);
        let img = rasterize(&long, &font, true).unwrap();
        assert_eq!(img.width() % 8, 0);
        assert!(img.width() <= 240);
        // Stops at the 24th character and drops one more.
        assert_eq!(fit_to_width(&long, &font).unwrap().len(), 22);
    }

    #[test]
    fn test_unknown_characters_are_skipped_without_fallback() {
        let font = test_font();
        assert_eq!(measure(b"a-A", &font).unwrap().width, 16);
    }

    #[test]
    fn test_empty_text_is_empty_image() {
        let font = test_font();
        assert!(rasterize(b"", &font, true).unwrap().is_empty());
    }

    #[test]
    fn test_glyph_above_matrix_is_invalid_asset() {
        // h + y_offset < 0: the glyph floats entirely above the baseline
        // and its top row falls outside the matrix.
        let glyph = Glyph {
            width: 1,
            height: 1,
            advance: 8,
            y_offset: -3,
            bitmap_offset: 0,
        };
        let font = Font::new(b'x', &[glyph], vec![0x80]).unwrap();
        assert_eq!(
            rasterize(b"x", &font, true).unwrap_err(),
            DisplayError::InvalidAsset
        );
    }

    #[test]
    fn test_round_trip_single_character_font_0() {
        let fonts = FontSet::builtin().unwrap();
        let font = fonts.get(0).unwrap();
        let glyph = *font.glyph(b'A').unwrap();
        let img = rasterize(b"A", font, true).unwrap();
        let m = measure(b"A", font).unwrap();

        // Un-invert (unpack reports ink) and un-flip.
        let mut rows = unpack(&img);
        rows.reverse();

        for j in 0..glyph.height {
            for c in 0..glyph.width {
                let row = usize::from(m.text_offset) + usize::from(j);
                assert_eq!(
                    rows[row][usize::from(c)],
                    font.glyph_pixel(&glyph, c, j),
                    "pixel ({c}, {j})"
                );
            }
        }
        // Nothing outside the glyph box.
        let inked: usize = rows.iter().map(|r| r.iter().filter(|p| **p).count()).sum();
        let expected = (0..glyph.height)
            .flat_map(|j| (0..glyph.width).map(move |c| (c, j)))
            .filter(|(c, j)| font.glyph_pixel(&glyph, *c, *j))
            .count();
        assert_eq!(inked, expected);
    }
}
