//! GDEW0371W7 / UC8171 Hardware Driver
//!
//! Blocking driver for the UC8171-class controller of the Good Display
//! GDEW0371W7 (240×416) panel.
//!
//! # Refresh protocol
//!
//! ```text
//! Off ──power_on──▶ On ──load_waveform──▶ On + LUT ──write_rows / fill_region──▶ …
//!  ▲                                                       │
//!  └──────────────────────── sleep ◀──── refresh ◀─────────┘
//! ```
//!
//! Every transfer is framed by a partial-area window:
//!
//! ```text
//! InitPartial (0x91)
//! SetPartialArea (0x90)  x_lo xe_lo y_hi y_lo ye_hi ye_lo 0x01
//! TransferOld (0x10) | TransferNew (0x13)  row bytes …
//! StopPartial (0x92)
//! ```
//!
//! A monochrome refresh only writes the `new` plane through the partial
//! LUT. The grayscale LUT drives each pixel from its `(old, new)` bit pair,
//! giving four levels on a bi-level panel.
//!
//! # Busy line
//!
//! BUSY is HIGH while the controller works. Each poll issues BusyCheck
//! (0x71) and samples the pin; the number of polls is bounded by
//! [`PanelTiming::max_busy_polls`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use platform::{DisplayInfo, PanelDriver, PanelTiming, PlaneKind, Region, Waveform};

use super::lut;
use super::transfer::{fill_row, shift_row};
use super::window::PartialWindow;
use super::{DisplayError, DISPLAY_HEIGHT, DISPLAY_WIDTH, ROW_STRIDE};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// UC8171 command codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Panel settings: 1 data byte (0x2F bi-level LUT from register, 0x3F grayscale).
    PanelSettings = 0x00,
    /// Power settings: 4 data bytes.
    PowerSettings = 0x01,
    /// Power off: no data.
    PowerOff = 0x02,
    /// Power on: no data; wait for BUSY.
    PowerOn = 0x04,
    /// Booster soft start: 3 data bytes.
    BoosterSoftStart = 0x06,
    /// Deep sleep: 1 check byte (0xA5).
    DeepSleep = 0x07,
    /// Data transfer to the `old` plane.
    TransferOld = 0x10,
    /// Display refresh: no data; wait for BUSY.
    Refresh = 0x12,
    /// Data transfer to the `new` plane.
    TransferNew = 0x13,
    /// VCOM LUT: 42 data bytes.
    LutVcom = 0x20,
    /// White to white LUT: 42 data bytes.
    LutWw = 0x21,
    /// Black to white LUT: 42 data bytes.
    LutBw = 0x22,
    /// White to black LUT: 42 data bytes.
    LutWb = 0x23,
    /// Black to black LUT: 42 data bytes.
    LutBb = 0x24,
    /// Border LUT: 42 data bytes.
    LutBorder = 0x25,
    /// PLL control: 1 data byte.
    Pll = 0x30,
    /// VCOM and data interval: 2 data bytes (1 before sleep).
    Interval = 0x50,
    /// Resolution: 3 data bytes (width, height high, height low).
    Resolution = 0x61,
    /// Latch the BUSY status onto the pin.
    BusyCheck = 0x71,
    /// Partial window: 7 data bytes.
    SetPartialArea = 0x90,
    /// Enter partial mode.
    InitPartial = 0x91,
    /// Leave partial mode.
    StopPartial = 0x92,
}

impl Command {
    /// Transfer command for `plane`.
    pub const fn transfer(plane: PlaneKind) -> Self {
        match plane {
            PlaneKind::Old => Self::TransferOld,
            PlaneKind::New => Self::TransferNew,
        }
    }
}

/// PanelSettings byte for bi-level updates with LUTs from registers.
pub const PANEL_SETTINGS_BW: u8 = 0x2F;
/// PanelSettings byte for the grayscale LUT set.
pub const PANEL_SETTINGS_GRAY: u8 = 0x3F;
/// VCOM and data interval used while drawing.
pub const INTERVAL_ACTIVE: [u8; 2] = [0x39, 0x07];
/// VCOM and data interval written before deep sleep.
pub const INTERVAL_SLEEP: u8 = 0xF7;
/// DeepSleep check code.
pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Panel power as tracked by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Deep sleep or never initialised
    #[default]
    Off,
    /// Reset, powered and configured
    On,
}

/// Refresh protocol state owned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSession {
    /// Power state
    pub power: PowerState,
    /// Loaded LUT set, `None` after power on
    pub lut: Option<Waveform>,
    /// Last partial window programmed
    pub window: Option<Region>,
}

impl RefreshSession {
    fn is_drawable(&self) -> bool {
        self.power == PowerState::On && self.lut.is_some()
    }
}

// ---------------------------------------------------------------------------
// Driver struct
// ---------------------------------------------------------------------------

/// GDEW0371W7 display driver.
///
/// Generic over:
/// - `SPI`: a blocking [`embedded_hal::spi::SpiDevice`] (manages CS).
/// - `DC`: Data/Command [`embedded_hal::digital::OutputPin`].
/// - `RST`: Reset [`embedded_hal::digital::OutputPin`].
/// - `BUSY`: Busy [`embedded_hal::digital::InputPin`] (HIGH when busy).
/// - `DELAY`: [`embedded_hal::delay::DelayNs`] for timing.
///
/// In host tests supply `embedded_hal_mock::eh1::delay::NoopDelay` or the
/// `platform::mocks` bus fakes.
pub struct Gdew0371w7<SPI, DC, RST, BUSY, DELAY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: DELAY,
    timing: PanelTiming,
    session: RefreshSession,
}

impl<SPI, DC, RST, BUSY, DELAY> Gdew0371w7<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    /// Create a driver with the reference timing. The panel stays off until
    /// [`PanelDriver::power_on`].
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: DELAY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            timing: PanelTiming::gdew0371w7(),
            session: RefreshSession::default(),
        }
    }

    /// Replace the protocol timing, e.g. from
    /// [`timing_for_temperature`](super::timing_for_temperature).
    #[must_use]
    pub fn with_timing(mut self, timing: PanelTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Current protocol timing.
    pub fn timing(&self) -> PanelTiming {
        self.timing
    }

    /// Current refresh session.
    pub fn session(&self) -> RefreshSession {
        self.session
    }

    // -----------------------------------------------------------------------
    // Low-level SPI helpers
    // -----------------------------------------------------------------------

    /// Assert DC low (command mode) and send one command byte over SPI.
    fn send_command(&mut self, cmd: Command) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Gpio)?;
        self.spi
            .write(&[cmd as u8])
            .map_err(|_| DisplayError::Communication)
    }

    /// Assert DC high (data mode) and send bytes over SPI.
    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| DisplayError::Gpio)?;
        self.spi
            .write(data)
            .map_err(|_| DisplayError::Communication)
    }

    /// Send one command followed immediately by its data bytes.
    fn cmd_data(&mut self, cmd: Command, data: &[u8]) -> Result<(), DisplayError> {
        self.send_command(cmd)?;
        self.send_data(data)
    }

    // -----------------------------------------------------------------------
    // BUSY polling
    // -----------------------------------------------------------------------

    /// Block until BUSY goes LOW (controller idle) or the poll budget runs
    /// out.
    fn wait_busy(&mut self) -> Result<(), DisplayError> {
        for _ in 0..self.timing.max_busy_polls {
            self.send_command(Command::BusyCheck)?;
            let is_busy = self.busy.is_high().map_err(|_| DisplayError::Gpio)?;
            if !is_busy {
                return Ok(());
            }
            self.delay.delay_ms(self.timing.busy_poll_interval_ms);
        }
        warn!(
            "panel busy for more than {} ms",
            self.timing.busy_budget_ms()
        );
        Err(DisplayError::ProtocolTimeout)
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Hardware reset sequence: RST LOW, wait, RST HIGH, wait.
    fn hardware_reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Gpio)?;
        self.delay.delay_ms(self.timing.reset_pulse_ms);
        self.rst.set_high().map_err(|_| DisplayError::Gpio)?;
        self.delay.delay_ms(self.timing.reset_pulse_ms);
        Ok(())
    }

    fn resolution() -> [u8; 3] {
        let [_, width] = DISPLAY_WIDTH.to_be_bytes();
        let [height_hi, height_lo] = DISPLAY_HEIGHT.to_be_bytes();
        [width, height_hi, height_lo]
    }

    // -----------------------------------------------------------------------
    // Window framing
    // -----------------------------------------------------------------------

    fn require_drawable(&self) -> Result<(), DisplayError> {
        if self.session.is_drawable() {
            Ok(())
        } else {
            Err(DisplayError::InvalidState)
        }
    }

    /// InitPartial, SetPartialArea and the transfer command for `plane`.
    fn open_window(&mut self, plane: PlaneKind, region: Region) -> Result<PartialWindow, DisplayError> {
        let window = PartialWindow::for_region(region).ok_or(DisplayError::OutOfBounds)?;
        self.send_command(Command::InitPartial)?;
        self.cmd_data(Command::SetPartialArea, &window.encode())?;
        self.send_command(Command::transfer(plane))?;
        self.session.window = Some(region);
        Ok(window)
    }

    fn close_window(&mut self) -> Result<(), DisplayError> {
        self.send_command(Command::StopPartial)
    }
}

// ---------------------------------------------------------------------------
// platform::PanelDriver implementation
// ---------------------------------------------------------------------------

impl<SPI, DC, RST, BUSY, DELAY> PanelDriver for Gdew0371w7<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    type DriverError = DisplayError;

    fn info(&self) -> DisplayInfo {
        DisplayInfo {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        }
    }

    /// Reset and configure the controller.
    ///
    /// Booster, power settings and power on, then panel settings, PLL,
    /// resolution and interval. Leaves no LUT loaded.
    fn power_on(&mut self) -> Result<(), Self::DriverError> {
        if self.session.power == PowerState::On {
            return Ok(());
        }
        self.hardware_reset()?;

        self.cmd_data(Command::BoosterSoftStart, &[0x17, 0x17, 0x1D])?;
        self.cmd_data(Command::PowerSettings, &[0x07, 0x07, 0x3F, 0x3F])?;
        self.send_command(Command::PowerOn)?;
        self.wait_busy()?;

        self.cmd_data(Command::PanelSettings, &[PANEL_SETTINGS_BW])?;
        self.cmd_data(Command::Pll, &[0x15])?;
        self.cmd_data(Command::Resolution, &Self::resolution())?;
        self.cmd_data(Command::Interval, &INTERVAL_ACTIVE)?;

        self.session = RefreshSession {
            power: PowerState::On,
            lut: None,
            window: None,
        };
        info!("panel powered on");
        Ok(())
    }

    /// Program the LUT registers for `waveform`.
    ///
    /// Grayscale switches the panel settings to 0x3F first; going back to
    /// partial restores 0x2F and the drawing interval.
    fn load_waveform(&mut self, waveform: Waveform) -> Result<(), Self::DriverError> {
        if self.session.power != PowerState::On {
            return Err(DisplayError::InvalidState);
        }
        if self.session.lut == Some(waveform) {
            return Ok(());
        }
        match waveform {
            Waveform::Grayscale => {
                self.cmd_data(Command::PanelSettings, &[PANEL_SETTINGS_GRAY])?;
                self.cmd_data(Command::Interval, &INTERVAL_ACTIVE)?;
            }
            Waveform::Partial if self.session.lut == Some(Waveform::Grayscale) => {
                self.cmd_data(Command::PanelSettings, &[PANEL_SETTINGS_BW])?;
                self.cmd_data(Command::Interval, &INTERVAL_ACTIVE)?;
            }
            Waveform::Partial => {}
        }
        for table in lut::tables(waveform) {
            self.cmd_data(table.command, table.data)?;
        }
        self.session.lut = Some(waveform);
        debug!("{} waveform loaded", waveform);
        Ok(())
    }

    /// Stream upright rows into a partial window of `plane`.
    ///
    /// Unaligned edges are shifted into the byte-aligned window and the
    /// pixels outside `region` are sent as background.
    fn write_rows(
        &mut self,
        plane: PlaneKind,
        region: Region,
        rows: &[u8],
    ) -> Result<(), Self::DriverError> {
        self.require_drawable()?;
        let src_bytes = usize::from(region.width).div_ceil(8);
        let expected = src_bytes
            .checked_mul(usize::from(region.height))
            .ok_or(DisplayError::OutOfBounds)?;
        if rows.len() != expected {
            return Err(DisplayError::OutOfBounds);
        }

        let window = self.open_window(plane, region)?;
        let mut buf = [0u8; ROW_STRIDE];
        let out = buf
            .get_mut(..window.bytes_per_row())
            .ok_or(DisplayError::OutOfBounds)?;
        for row in rows.chunks_exact(src_bytes) {
            shift_row(row, region.x, region.width, out)?;
            self.send_data(out)?;
        }
        self.close_window()
    }

    /// Fill a partial window of `plane` with `value`, edge bytes masked to
    /// background outside `region`.
    fn fill_region(
        &mut self,
        plane: PlaneKind,
        region: Region,
        value: u8,
    ) -> Result<(), Self::DriverError> {
        self.require_drawable()?;
        let window = self.open_window(plane, region)?;
        let mut buf = [0u8; ROW_STRIDE];
        let out = buf
            .get_mut(..window.bytes_per_row())
            .ok_or(DisplayError::OutOfBounds)?;
        fill_row(value, region.x, region.width, out)?;
        for _ in 0..window.rows() {
            self.send_data(out)?;
        }
        self.close_window()
    }

    /// Refresh, let the controller settle, then wait for BUSY to clear.
    fn refresh(&mut self) -> Result<(), Self::DriverError> {
        self.require_drawable()?;
        self.send_command(Command::Refresh)?;
        self.delay.delay_ms(self.timing.refresh_settle_ms);
        self.wait_busy()?;
        debug!("refresh complete");
        Ok(())
    }

    /// Enter deep sleep. The LUT and window are forgotten; the next draw
    /// needs a fresh power on.
    fn sleep(&mut self) -> Result<(), Self::DriverError> {
        if self.session.power == PowerState::Off {
            return Ok(());
        }
        self.cmd_data(Command::Interval, &[INTERVAL_SLEEP])?;
        self.send_command(Command::PowerOff)?;
        self.cmd_data(Command::DeepSleep, &[DEEP_SLEEP_CHECK])?;
        self.session = RefreshSession::default();
        info!("panel asleep");
        Ok(())
    }
}
