//! Mock implementations for testing
//!
//! - [`MockPanel`] records [`PanelDriver`] calls at the protocol level.
//! - [`MemoryStorage`] serves files from a map.
//! - [`BusRecorder`] hands out SPI / DC / RST fakes that log the raw
//!   command and data frames a real driver emits, for byte-level checks of
//!   transfers too large to script with expectation mocks.

#![cfg(any(test, feature = "std"))]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal::digital;
use embedded_hal::spi::{self, Operation};

use crate::display::{DisplayInfo, PanelDriver, PanelError, PlaneKind, Region, Waveform};
use crate::storage::Storage;

// ---------------------------------------------------------------------------
// MockPanel
// ---------------------------------------------------------------------------

/// One recorded [`PanelDriver`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOp {
    /// `power_on`
    PowerOn,
    /// `load_waveform`
    LoadWaveform(Waveform),
    /// `write_rows` with the streamed bytes
    WriteRows {
        /// Target plane
        plane: PlaneKind,
        /// Target window
        region: Region,
        /// Row bytes as passed in
        rows: Vec<u8>,
    },
    /// `fill_region`
    Fill {
        /// Target plane
        plane: PlaneKind,
        /// Target window
        region: Region,
        /// Fill byte
        value: u8,
    },
    /// `refresh`
    Refresh,
    /// `sleep`
    Sleep,
}

/// Mock panel that records every call.
pub struct MockPanel {
    info: DisplayInfo,
    ops: Vec<PanelOp>,
    refresh_error: Option<PanelError>,
}

impl MockPanel {
    /// Create a mock panel of the given size
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            info: DisplayInfo { width, height },
            ops: Vec::new(),
            refresh_error: None,
        }
    }

    /// Make every subsequent `refresh` fail with `error`.
    pub fn fail_refresh_with(&mut self, error: PanelError) {
        self.refresh_error = Some(error);
    }

    /// Recorded calls, oldest first
    pub fn ops(&self) -> &[PanelOp] {
        &self.ops
    }

    /// Number of `refresh` calls
    pub fn refresh_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == PanelOp::Refresh).count()
    }

    /// Forget all recorded calls
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    fn check(&self, region: Region) -> Result<(), PanelError> {
        if region.is_empty() || !region.fits_within(self.info.width, self.info.height) {
            return Err(PanelError::InvalidRegion);
        }
        Ok(())
    }
}

impl PanelDriver for MockPanel {
    type DriverError = PanelError;

    fn info(&self) -> DisplayInfo {
        self.info
    }

    fn power_on(&mut self) -> Result<(), Self::DriverError> {
        self.ops.push(PanelOp::PowerOn);
        Ok(())
    }

    fn load_waveform(&mut self, waveform: Waveform) -> Result<(), Self::DriverError> {
        self.ops.push(PanelOp::LoadWaveform(waveform));
        Ok(())
    }

    fn write_rows(
        &mut self,
        plane: PlaneKind,
        region: Region,
        rows: &[u8],
    ) -> Result<(), Self::DriverError> {
        self.check(region)?;
        self.ops.push(PanelOp::WriteRows {
            plane,
            region,
            rows: rows.to_vec(),
        });
        Ok(())
    }

    fn fill_region(
        &mut self,
        plane: PlaneKind,
        region: Region,
        value: u8,
    ) -> Result<(), Self::DriverError> {
        self.check(region)?;
        self.ops.push(PanelOp::Fill {
            plane,
            region,
            value,
        });
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), Self::DriverError> {
        self.ops.push(PanelOp::Refresh);
        match self.refresh_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn sleep(&mut self) -> Result<(), Self::DriverError> {
        self.ops.push(PanelOp::Sleep);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Errors from [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryStorageError {
    /// No file with that name
    NotFound(String),
}

/// In-memory file store
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a file
    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.files.insert(name.to_string(), bytes);
    }
}

impl Storage for MemoryStorage {
    type Error = MemoryStorageError;

    fn file_size(&mut self, name: &str) -> Result<usize, Self::Error> {
        self.files
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| MemoryStorageError::NotFound(name.to_string()))
    }

    fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let data = self
            .files
            .get(name)
            .ok_or_else(|| MemoryStorageError::NotFound(name.to_string()))?;
        let n = data.len().min(buf.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), data.get(..n)) {
            dst.copy_from_slice(src);
        }
        Ok(n)
    }

    fn exists(&mut self, name: &str) -> Result<bool, Self::Error> {
        Ok(self.files.contains_key(name))
    }
}

// ---------------------------------------------------------------------------
// BusRecorder
// ---------------------------------------------------------------------------

/// One frame on the panel bus, split by the DC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusFrame {
    /// Byte written while DC was low
    Command(u8),
    /// Consecutive bytes written while DC was high
    Data(Vec<u8>),
    /// RST driven to the given level (`true` = high)
    Reset(bool),
}

#[derive(Debug, Default)]
struct BusLog {
    dc_high: bool,
    frames: Vec<BusFrame>,
}

impl BusLog {
    fn record(&mut self, bytes: &[u8]) {
        if self.dc_high {
            if let Some(BusFrame::Data(data)) = self.frames.last_mut() {
                data.extend_from_slice(bytes);
            } else {
                self.frames.push(BusFrame::Data(bytes.to_vec()));
            }
        } else {
            self.frames
                .extend(bytes.iter().map(|b| BusFrame::Command(*b)));
        }
    }
}

/// Shared log behind the recording SPI, DC and RST fakes.
#[derive(Debug, Clone, Default)]
pub struct BusRecorder {
    log: Rc<RefCell<BusLog>>,
}

impl BusRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// SPI device writing into this recorder
    pub fn spi(&self) -> RecordingSpi {
        RecordingSpi {
            log: Rc::clone(&self.log),
        }
    }

    /// DC pin selecting command (low) or data (high) frames
    pub fn dc(&self) -> RecordingDc {
        RecordingDc {
            log: Rc::clone(&self.log),
        }
    }

    /// RST pin logging its level changes
    pub fn rst(&self) -> RecordingRst {
        RecordingRst {
            log: Rc::clone(&self.log),
        }
    }

    /// All frames, oldest first
    pub fn frames(&self) -> Vec<BusFrame> {
        self.log.borrow().frames.clone()
    }

    /// Command bytes only, in order
    pub fn commands(&self) -> Vec<u8> {
        self.log
            .borrow()
            .frames
            .iter()
            .filter_map(|f| match f {
                BusFrame::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// For every occurrence of `command`, the data that followed it
    /// (empty when the next frame is another command).
    pub fn payloads(&self, command: u8) -> Vec<Vec<u8>> {
        let log = self.log.borrow();
        let mut out = Vec::new();
        let mut frames = log.frames.iter().peekable();
        while let Some(frame) = frames.next() {
            if *frame == BusFrame::Command(command) {
                match frames.peek() {
                    Some(BusFrame::Data(data)) => out.push(data.clone()),
                    _ => out.push(Vec::new()),
                }
            }
        }
        out
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.log.borrow_mut().frames.clear();
    }
}

/// Recording [`spi::SpiDevice`]; reads return zeros.
#[derive(Debug, Clone)]
pub struct RecordingSpi {
    log: Rc<RefCell<BusLog>>,
}

impl spi::ErrorType for RecordingSpi {
    type Error = core::convert::Infallible;
}

impl spi::SpiDevice for RecordingSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => log.record(bytes),
                Operation::Transfer(read, write) => {
                    log.record(write);
                    read.fill(0);
                }
                Operation::TransferInPlace(bytes) => {
                    log.record(bytes);
                    bytes.fill(0);
                }
                Operation::Read(buf) => buf.fill(0),
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// Recording DC pin
#[derive(Debug, Clone)]
pub struct RecordingDc {
    log: Rc<RefCell<BusLog>>,
}

impl digital::ErrorType for RecordingDc {
    type Error = core::convert::Infallible;
}

impl digital::OutputPin for RecordingDc {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().dc_high = true;
        Ok(())
    }
}

/// Recording RST pin
#[derive(Debug, Clone)]
pub struct RecordingRst {
    log: Rc<RefCell<BusLog>>,
}

impl digital::ErrorType for RecordingRst {
    type Error = core::convert::Infallible;
}

impl digital::OutputPin for RecordingRst {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().frames.push(BusFrame::Reset(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().frames.push(BusFrame::Reset(true));
        Ok(())
    }
}

/// BUSY pin that reports busy for a fixed number of reads, then idle.
///
/// `ScriptedBusy::stuck()` never releases, for timeout tests.
#[derive(Debug, Clone)]
pub struct ScriptedBusy {
    busy_reads: Option<usize>,
    reads: usize,
}

impl ScriptedBusy {
    /// Busy for `busy_reads` reads, then idle forever
    pub fn releasing_after(busy_reads: usize) -> Self {
        Self {
            busy_reads: Some(busy_reads),
            reads: 0,
        }
    }

    /// Always idle
    pub fn idle() -> Self {
        Self::releasing_after(0)
    }

    /// Always busy
    pub fn stuck() -> Self {
        Self {
            busy_reads: None,
            reads: 0,
        }
    }

    /// Number of times the line was sampled
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl digital::ErrorType for ScriptedBusy {
    type Error = core::convert::Infallible;
}

impl digital::InputPin for ScriptedBusy {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let busy = self.busy_reads.map_or(true, |limit| self.reads < limit);
        self.reads = self.reads.saturating_add(1);
        Ok(busy)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use embedded_hal::digital::{InputPin, OutputPin};
    use embedded_hal::spi::SpiDevice;

    #[test]
    fn test_bus_recorder_splits_frames_on_dc() {
        let bus = BusRecorder::new();
        let mut spi = bus.spi();
        let mut dc = bus.dc();

        dc.set_low().unwrap();
        spi.write(&[0x61]).unwrap();
        dc.set_high().unwrap();
        spi.write(&[0xF0]).unwrap();
        spi.write(&[0x01, 0xA0]).unwrap();
        dc.set_low().unwrap();
        spi.write(&[0x12]).unwrap();

        assert_eq!(
            bus.frames(),
            vec![
                BusFrame::Command(0x61),
                BusFrame::Data(vec![0xF0, 0x01, 0xA0]),
                BusFrame::Command(0x12),
            ]
        );
        assert_eq!(bus.commands(), vec![0x61, 0x12]);
        assert_eq!(bus.payloads(0x61), vec![vec![0xF0, 0x01, 0xA0]]);
        assert_eq!(bus.payloads(0x12), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_scripted_busy_releases() {
        let mut busy = ScriptedBusy::releasing_after(2);
        assert!(busy.is_high().unwrap());
        assert!(busy.is_high().unwrap());
        assert!(busy.is_low().unwrap());
        assert_eq!(busy.reads(), 3);

        let mut stuck = ScriptedBusy::stuck();
        for _ in 0..100 {
            assert!(stuck.is_high().unwrap());
        }
    }

    #[test]
    fn test_memory_storage_reads() {
        let mut storage = MemoryStorage::new().with_file("a.bmp", vec![1, 2, 3]);
        assert_eq!(storage.file_size("a.bmp").unwrap(), 3);
        let mut buf = [0u8; 2];
        assert_eq!(storage.read_file("a.bmp", &mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert!(storage.exists("a.bmp").unwrap());
        assert_eq!(
            storage.file_size("b.bmp"),
            Err(MemoryStorageError::NotFound("b.bmp".to_string()))
        );
    }

    #[test]
    fn test_mock_panel_rejects_regions_outside() {
        let mut panel = MockPanel::new(240, 416);
        assert_eq!(
            panel.fill_region(PlaneKind::New, Region::new(236, 0, 8, 1), 0),
            Err(PanelError::InvalidRegion)
        );
        panel.fail_refresh_with(PanelError::Timeout);
        assert_eq!(panel.refresh(), Err(PanelError::Timeout));
        assert_eq!(panel.refresh_count(), 1);
    }
}
