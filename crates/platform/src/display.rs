//! Panel abstraction layer
//!
//! [`PanelDriver`] is the seam between the display engine and an e-paper
//! controller. It speaks in regions of packed 1bpp bytes and leaves the
//! command bytes, LUT tables and busy handling to the implementation.

/// Rectangle in panel pixel coordinates, origin top-left as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Region {
    /// Left edge in pixels
    pub x: u16,
    /// Top edge in pixels
    pub y: u16,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Region {
    /// Create a region from its origin and size.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole panel.
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One past the right-most column (widened to avoid `u16` overflow).
    // Two u16 values summed in u32 cannot overflow.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// One past the bottom-most row (widened to avoid `u16` overflow).
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// `true` when the region covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when `x + width <= panel_width` and `y + height <= panel_height`.
    pub const fn fits_within(&self, panel_width: u16, panel_height: u16) -> bool {
        self.right() <= panel_width as u32 && self.bottom() <= panel_height as u32
    }

    /// `true` when both horizontal edges sit on byte boundaries.
    pub const fn is_byte_aligned(&self) -> bool {
        self.x % 8 == 0 && self.width % 8 == 0
    }
}

/// Which of the two controller RAM planes a transfer targets.
///
/// A monochrome refresh only uses [`PlaneKind::New`]; the grayscale
/// technique streams both, old first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaneKind {
    /// Previous-frame plane (transfer command A)
    Old,
    /// Current-frame plane (transfer command B)
    New,
}

impl core::fmt::Display for PlaneKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Waveform lookup tables loaded into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Waveform {
    /// Short bi-level tables for monochrome partial updates
    Partial,
    /// Four-level tables for the two-pass grayscale technique
    Grayscale,
}

impl core::fmt::Display for Waveform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Partial => write!(f, "partial"),
            Self::Grayscale => write!(f, "grayscale"),
        }
    }
}

/// Panel geometry reported by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayInfo {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

/// E-paper refresh protocol.
///
/// Call order for one screen: [`power_on`](Self::power_on) →
/// [`load_waveform`](Self::load_waveform) → any number of
/// [`write_rows`](Self::write_rows) / [`fill_region`](Self::fill_region) →
/// [`refresh`](Self::refresh) → [`sleep`](Self::sleep). A sequence that has
/// started must be run to completion; the controller cannot be interrupted
/// mid-refresh.
pub trait PanelDriver {
    /// Error type for panel operations
    type DriverError: core::fmt::Debug;

    /// Panel dimensions
    fn info(&self) -> DisplayInfo;

    /// Reset and power the panel. No-op if already powered.
    fn power_on(&mut self) -> Result<(), Self::DriverError>;

    /// Program the waveform tables. No-op if `waveform` is already loaded.
    fn load_waveform(&mut self, waveform: Waveform) -> Result<(), Self::DriverError>;

    /// Stream packed rows into `region` of `plane`.
    ///
    /// `rows` holds `region.height` upright rows (top row first), each
    /// `ceil(region.width / 8)` bytes, MSB-first, `0` = ink.
    fn write_rows(
        &mut self,
        plane: PlaneKind,
        region: Region,
        rows: &[u8],
    ) -> Result<(), Self::DriverError>;

    /// Fill `region` of `plane` with `value`.
    ///
    /// Pixels that share a byte with the region edges but lie outside it
    /// are written as background.
    fn fill_region(
        &mut self,
        plane: PlaneKind,
        region: Region,
        value: u8,
    ) -> Result<(), Self::DriverError>;

    /// Trigger a physical refresh and wait until the panel is idle.
    fn refresh(&mut self) -> Result<(), Self::DriverError>;

    /// Put the panel into deep sleep. [`power_on`](Self::power_on) must run
    /// again before further use.
    fn sleep(&mut self) -> Result<(), Self::DriverError>;
}

/// Faults reported by panel implementations that do not carry their own
/// error type (mocks, simulators).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Bus transfer failed
    Communication,
    /// Busy line never released
    Timeout,
    /// Operation issued in the wrong protocol state
    InvalidState,
    /// Region outside the panel
    InvalidRegion,
}

#[cfg(feature = "std")]
impl std::error::Error for PanelError {}

impl core::fmt::Display for PanelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Communication => write!(f, "Panel communication error"),
            Self::Timeout => write!(f, "Panel busy timeout"),
            Self::InvalidState => write!(f, "Panel in invalid state"),
            Self::InvalidRegion => write!(f, "Region outside the panel"),
        }
    }
}
