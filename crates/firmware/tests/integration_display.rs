//! Display integration tests: manager, driver and recording bus together.
//!
//! The manager drives a real `Gdew0371w7` whose SPI, DC and RST lines are
//! `platform::mocks::BusRecorder` fakes, so every command and data frame a
//! full-screen render puts on the bus can be checked.
//!
//! Run with: cargo test -p badge-firmware --test integration_display

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use badge_firmware::display::{Command, ImageKind, PowerState};
use badge_firmware::{DisplayError, DisplayManager, Gdew0371w7, DISPLAY_HEIGHT, DISPLAY_WIDTH, PLANE_BYTES};
use embedded_hal_mock::eh1::delay::NoopDelay;
use platform::mocks::{BusRecorder, MemoryStorage, RecordingDc, RecordingRst, RecordingSpi, ScriptedBusy};
use platform::{PanelDriver, PanelTiming, PlaneKind};

type RecordedPanel = Gdew0371w7<RecordingSpi, RecordingDc, RecordingRst, ScriptedBusy, NoopDelay>;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn manager(storage: MemoryStorage) -> (BusRecorder, DisplayManager<RecordedPanel, MemoryStorage>) {
    let bus = BusRecorder::new();
    let panel = Gdew0371w7::new(bus.spi(), bus.dc(), bus.rst(), ScriptedBusy::idle(), NoopDelay);
    let display = DisplayManager::new(panel, storage).unwrap();
    (bus, display)
}

fn count(bus: &BusRecorder, command: Command) -> usize {
    bus.commands().iter().filter(|c| **c == command as u8).count()
}

/// Full-screen 4 bpp BMP whose bottom memory row is black and the rest
/// white.
fn background_bmp() -> Vec<u8> {
    let offset: u32 = 14 + 40 + 64;
    let mut bmp = vec![0u8; offset as usize];
    bmp[0..2].copy_from_slice(b"BM");
    bmp[0x0A..0x0E].copy_from_slice(&offset.to_le_bytes());
    bmp[0x12..0x16].copy_from_slice(&240i32.to_le_bytes());
    bmp[0x16..0x1A].copy_from_slice(&416i32.to_le_bytes());
    bmp[0x1C..0x1E].copy_from_slice(&4u16.to_le_bytes());
    let mut pixels = vec![0x33u8; PLANE_BYTES * 4];
    pixels[..120].fill(0x00);
    bmp.extend_from_slice(&pixels);
    bmp
}

// ---------------------------------------------------------------------------
// Test: constants
// ---------------------------------------------------------------------------

#[test]
fn test_display_constants() {
    assert_eq!(DISPLAY_WIDTH, 240, "GDEW0371W7 is 240 pixels wide");
    assert_eq!(DISPLAY_HEIGHT, 416, "GDEW0371W7 is 416 pixels tall");
    assert_eq!(PLANE_BYTES, 12_480);
}

// ---------------------------------------------------------------------------
// Test: full monochrome render
// ---------------------------------------------------------------------------

/// One window per memory row, new plane only, then refresh and sleep.
#[test]
fn test_monochrome_render_frames_every_row() {
    let (bus, mut display) = manager(MemoryStorage::new());
    display.write_centered_message("Hello", 40, 1, false).unwrap();
    display.render_full_display(ImageKind::Monochrome).unwrap();

    assert_eq!(count(&bus, Command::InitPartial), 416);
    assert_eq!(count(&bus, Command::StopPartial), 416);
    assert_eq!(count(&bus, Command::TransferNew), 416);
    assert_eq!(count(&bus, Command::TransferOld), 0);
    assert_eq!(count(&bus, Command::Refresh), 1);
    assert_eq!(count(&bus, Command::DeepSleep), 1);

    let windows = bus.payloads(Command::SetPartialArea as u8);
    // Memory row 0 is screen row 415 = 0x019F.
    assert_eq!(windows[0], vec![0x00, 0xEF, 0x01, 0x9F, 0x01, 0x9F, 0x01]);
    assert_eq!(windows[415], vec![0x00, 0xEF, 0x00, 0x00, 0x00, 0x00, 0x01]);

    let rows = bus.payloads(Command::TransferNew as u8);
    assert!(rows.iter().all(|r| r.len() == 30));
    // Text at y = 40 inks some rows near the top of the screen, i.e. late
    // in the stream.
    assert!(rows[350..].iter().any(|r| r.iter().any(|b| *b != 0xFF)));
    assert!(rows[..300].iter().all(|r| r.iter().all(|b| *b == 0xFF)));

    assert_eq!(display.panel().session().power, PowerState::Off);
}

// ---------------------------------------------------------------------------
// Test: grayscale background render
// ---------------------------------------------------------------------------

/// A decoded background reaches the bus unchanged, old plane first.
#[test]
fn test_grayscale_background_streams_both_planes() {
    let storage = MemoryStorage::new().with_file("bg.bmp", background_bmp());
    let (bus, mut display) = manager(storage);

    assert_eq!(display.write_background("bg.bmp").unwrap(), ImageKind::Grayscale);
    display.render_full_display(ImageKind::Grayscale).unwrap();

    assert_eq!(bus.payloads(Command::PanelSettings as u8).last(), Some(&vec![0x3F]));
    let old = bus.payloads(Command::TransferOld as u8);
    let new = bus.payloads(Command::TransferNew as u8);
    assert_eq!(old.len(), 416);
    assert_eq!(new.len(), 416);
    assert_eq!(old[0], vec![0x00; 30]);
    assert_eq!(old[1], vec![0xFF; 30]);
    assert_eq!(new[0], display.planes().row(PlaneKind::New, 0).unwrap());

    // All old-plane transfers precede the first new-plane transfer.
    let commands = bus.commands();
    let last_old = commands.iter().rposition(|c| *c == Command::TransferOld as u8).unwrap();
    let first_new = commands.iter().position(|c| *c == Command::TransferNew as u8).unwrap();
    assert!(last_old < first_new);
}

// ---------------------------------------------------------------------------
// Test: busy timeout aborts the render
// ---------------------------------------------------------------------------

#[test]
fn test_stuck_panel_times_out() {
    let bus = BusRecorder::new();
    let timing = PanelTiming {
        max_busy_polls: 3,
        ..PanelTiming::gdew0371w7()
    };
    let panel = Gdew0371w7::new(bus.spi(), bus.dc(), bus.rst(), ScriptedBusy::stuck(), NoopDelay)
        .with_timing(timing);
    let mut display = DisplayManager::new(panel, MemoryStorage::new()).unwrap();

    assert_eq!(
        display.render_full_display(ImageKind::Monochrome),
        Err(DisplayError::ProtocolTimeout)
    );
    assert_eq!(count(&bus, Command::BusyCheck), 3);
    assert_eq!(count(&bus, Command::InitPartial), 0);
}

// ---------------------------------------------------------------------------
// Test: direct text
// ---------------------------------------------------------------------------

/// Direct text writes one window with upright rows.
#[test]
fn test_direct_text_uses_one_window() {
    let (bus, mut display) = manager(MemoryStorage::new());
    display.start_text_to_screen().unwrap();
    bus.clear();
    display.write_text_to_screen("12:30", 8, 100, 0).unwrap();

    let windows = bus.payloads(Command::SetPartialArea as u8);
    assert_eq!(windows.len(), 1);
    assert_eq!(&windows[0][..4], &[0x08, 0x2F, 0x00, 100]);
    assert_eq!(bus.commands().last(), Some(&(Command::StopPartial as u8)));

    display.update_text_to_screen().unwrap();
    assert_eq!(display.panel().session().power, PowerState::Off);
    assert_eq!(display.panel_mut().info().width, 240);
}
