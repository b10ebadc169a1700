//! Bitmap fonts in GFX glyph-table form
//!
//! Each [`Glyph`] points into a shared bitmap blob. A glyph's pixels are
//! packed continuously across rows (no per-row padding), MSB-first,
//! starting at the first bit of byte `bitmap_offset`. `y_offset` is the
//! signed distance from the baseline to the top row of the glyph; glyphs
//! above the baseline have negative offsets.
//!
//! The badge ships three faces built at start-up from the
//! `embedded-graphics` ASCII mono fonts.

use alloc::vec::Vec;

use embedded_graphics::mono_font::ascii::{FONT_6X13, FONT_8X13, FONT_8X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use super::DisplayError;

/// Maximum glyphs per font (printable ASCII).
pub const MAX_GLYPHS: usize = 95;

/// First character of the built-in fonts.
pub const FIRST_CHAR: u8 = b' ';

/// Character drawn in place of ones the font lacks.
pub const FALLBACK_CHAR: u8 = b'?';

/// Metrics and bitmap location of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    /// Bitmap width in pixels
    pub width: u8,
    /// Bitmap height in pixels
    pub height: u8,
    /// Horizontal distance to the next character
    pub advance: u8,
    /// Baseline to top row, negative above the baseline
    pub y_offset: i8,
    /// First byte of the glyph in the font bitmap
    pub bitmap_offset: u16,
}

/// Glyph table plus bitmap blob for a contiguous character range.
#[derive(Debug, Clone)]
pub struct Font {
    first: u8,
    glyphs: heapless::Vec<Glyph, MAX_GLYPHS>,
    bitmap: Vec<u8>,
}

impl Font {
    /// Font covering `first ..= first + glyphs.len() - 1`.
    ///
    /// Fails with [`DisplayError::InvalidAsset`] when a glyph's bits run
    /// past the end of `bitmap` or there are more than [`MAX_GLYPHS`].
    pub fn new(first: u8, glyphs: &[Glyph], bitmap: Vec<u8>) -> Result<Self, DisplayError> {
        let glyphs: heapless::Vec<Glyph, MAX_GLYPHS> =
            heapless::Vec::from_slice(glyphs).map_err(|_| DisplayError::InvalidAsset)?;
        for glyph in &glyphs {
            let bits = usize::from(glyph.width).saturating_mul(usize::from(glyph.height));
            let end = usize::from(glyph.bitmap_offset).saturating_add(bits.div_ceil(8));
            if end > bitmap.len() {
                return Err(DisplayError::InvalidAsset);
            }
        }
        Ok(Self {
            first,
            glyphs,
            bitmap,
        })
    }

    /// Rasterize the printable ASCII range of an `embedded-graphics` mono font.
    ///
    /// Glyph rows are trimmed to the inked extent at the top; the bottom is
    /// kept down to at least the baseline row so every glyph ends on or below
    /// it. Blank glyphs (space) get zero height.
    pub fn from_mono(mono: &MonoFont<'_>) -> Result<Self, DisplayError> {
        let cell_w = u8::try_from(mono.character_size.width).map_err(|_| DisplayError::InvalidAsset)?;
        let cell_h = u8::try_from(mono.character_size.height).map_err(|_| DisplayError::InvalidAsset)?;
        let spacing = u8::try_from(mono.character_spacing).map_err(|_| DisplayError::InvalidAsset)?;
        let baseline = u8::try_from(mono.baseline).map_err(|_| DisplayError::InvalidAsset)?;
        let advance = cell_w.checked_add(spacing).ok_or(DisplayError::InvalidAsset)?;

        let mut canvas = GlyphCanvas::new(cell_w, cell_h);
        let mut glyphs: heapless::Vec<Glyph, MAX_GLYPHS> = heapless::Vec::new();
        let mut bitmap = Vec::new();

        for code in FIRST_CHAR..=b'~' {
            canvas.clear();
            let mut utf8 = [0u8; 4];
            let text = char::from(code).encode_utf8(&mut utf8);
            let style = MonoTextStyle::new(mono, BinaryColor::On);
            match Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut canvas) {
                Ok(_) => {}
                Err(never) => match never {},
            }

            let glyph = match canvas.inked_rows() {
                None => Glyph {
                    width: cell_w,
                    height: 0,
                    advance,
                    y_offset: 0,
                    bitmap_offset: offset_of(&bitmap)?,
                },
                Some((top, bottom)) => {
                    let bottom = bottom.max(baseline).min(cell_h.saturating_sub(1));
                    let bitmap_offset = offset_of(&bitmap)?;
                    canvas.pack_rows(top, bottom, &mut bitmap)?;
                    // baseline + 1 is the GFX cursor row, one below the baseline pixels.
                    #[allow(clippy::arithmetic_side_effects)]
                    let y_offset = i16::from(top) - i16::from(baseline) - 1;
                    Glyph {
                        width: cell_w,
                        height: bottom.saturating_sub(top).saturating_add(1),
                        advance,
                        y_offset: i8::try_from(y_offset).map_err(|_| DisplayError::InvalidAsset)?,
                        bitmap_offset,
                    }
                }
            };
            glyphs.push(glyph).map_err(|_| DisplayError::InvalidAsset)?;
        }

        Ok(Self {
            first: FIRST_CHAR,
            glyphs,
            bitmap,
        })
    }

    /// Glyph for `c`, if the font covers it.
    pub fn glyph(&self, c: u8) -> Option<&Glyph> {
        let index = c.checked_sub(self.first)?;
        self.glyphs.get(usize::from(index))
    }

    /// Glyph for `c`, or the fallback glyph when `c` is not covered.
    pub fn glyph_or_fallback(&self, c: u8) -> Option<&Glyph> {
        self.glyph(c).or_else(|| self.glyph(FALLBACK_CHAR))
    }

    /// Sum of advances for `text`, skipping characters with no glyph.
    pub fn text_advance(&self, text: &[u8]) -> u32 {
        text.iter()
            .filter_map(|c| self.glyph_or_fallback(*c))
            .fold(0u32, |sum, g| sum.saturating_add(u32::from(g.advance)))
    }

    /// Pixel `(col, row)` of `glyph` (`true` = ink). Outside the glyph is blank.
    pub fn glyph_pixel(&self, glyph: &Glyph, col: u8, row: u8) -> bool {
        if col >= glyph.width || row >= glyph.height {
            return false;
        }
        let bit = usize::from(row)
            .saturating_mul(usize::from(glyph.width))
            .saturating_add(usize::from(col));
        let byte = usize::from(glyph.bitmap_offset).saturating_add(bit / 8);
        // bit % 8 < 8
        #[allow(clippy::arithmetic_side_effects)]
        let mask = 0x80u8 >> (bit % 8);
        self.bitmap.get(byte).is_some_and(|b| b & mask != 0)
    }
}

fn offset_of(bitmap: &[u8]) -> Result<u16, DisplayError> {
    u16::try_from(bitmap.len()).map_err(|_| DisplayError::InvalidAsset)
}

/// The badge's three faces: book (0), bold (1) and condensed (2).
#[derive(Debug, Clone)]
pub struct FontSet {
    fonts: [Font; 3],
}

impl FontSet {
    /// Build the built-in faces.
    pub fn builtin() -> Result<Self, DisplayError> {
        Ok(Self {
            fonts: [
                Font::from_mono(&FONT_8X13)?,
                Font::from_mono(&FONT_8X13_BOLD)?,
                Font::from_mono(&FONT_6X13)?,
            ],
        })
    }

    /// Set made of caller-supplied faces, indexed in order.
    pub fn from_fonts(fonts: [Font; 3]) -> Self {
        Self { fonts }
    }

    /// Face `index`, or [`DisplayError::UnknownFont`].
    pub fn get(&self, index: u8) -> Result<&Font, DisplayError> {
        self.fonts
            .get(usize::from(index))
            .ok_or(DisplayError::UnknownFont)
    }
}

/// Scratch target one character cell in size.
struct GlyphCanvas {
    width: u8,
    height: u8,
    cells: Vec<bool>,
}

impl GlyphCanvas {
    fn new(width: u8, height: u8) -> Self {
        let len = usize::from(width).saturating_mul(usize::from(height));
        Self {
            width,
            height,
            cells: alloc::vec![false; len],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(false);
    }

    fn row(&self, row: u8) -> &[bool] {
        let w = usize::from(self.width);
        let start = usize::from(row).saturating_mul(w);
        self.cells
            .get(start..start.saturating_add(w))
            .unwrap_or_default()
    }

    /// First and last rows containing ink.
    fn inked_rows(&self) -> Option<(u8, u8)> {
        let inked = |r: &u8| self.row(*r).iter().any(|c| *c);
        let top = (0..self.height).find(inked)?;
        let bottom = (0..self.height).rev().find(inked)?;
        Some((top, bottom))
    }

    /// Append rows `top ..= bottom` to `out`, bits packed continuously.
    fn pack_rows(&self, top: u8, bottom: u8, out: &mut Vec<u8>) -> Result<(), DisplayError> {
        let mut acc = 0u8;
        let mut filled = 0u8;
        for row in top..=bottom {
            for &on in self.row(row) {
                acc = (acc << 1) | u8::from(on);
                filled = filled.saturating_add(1);
                if filled == 8 {
                    out.try_reserve(1).map_err(|_| DisplayError::Capacity)?;
                    out.push(acc);
                    acc = 0;
                    filled = 0;
                }
            }
        }
        if filled > 0 {
            out.try_reserve(1).map_err(|_| DisplayError::Capacity)?;
            // filled is 1..=7 here
            #[allow(clippy::arithmetic_side_effects)]
            out.push(acc << (8 - filled));
        }
        Ok(())
    }
}

impl OriginDimensions for GlyphCanvas {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl DrawTarget for GlyphCanvas {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u8::try_from(point.x), u8::try_from(point.y)) else {
                continue;
            };
            if x >= self.width || y >= self.height {
                continue;
            }
            let index = usize::from(y)
                .saturating_mul(usize::from(self.width))
                .saturating_add(usize::from(x));
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = color.is_on();
            }
        }
        Ok(())
    }
}
