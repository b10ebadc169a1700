//! Badge Display Firmware
//!
//! Composition and refresh engine for the GDEW0371W7 (240×416) e-paper
//! badge display.
//!
//! # Architecture
//!
//! ```text
//! Badge screens (menu / state machine)
//!         ↓
//! DisplayManager (display::manager)
//!         ↓
//! Text rasterizer / bitmap decoder → compositor → PlaneStore
//!         ↓
//! PanelDriver (Gdew0371w7 on hardware, MockPanel in tests)
//!         ↓
//! embedded-hal SPI device + DC / RST / BUSY pins
//! ```
//!
//! Screens are built into two packed 1bpp planes (`old` and `new`) and
//! flushed in one refresh. Streaming both planes through the grayscale
//! waveform yields four gray levels on a bi-level panel.
//!
//! # Features
//!
//! - `std` (default) - host builds: `tracing` logs, `std::error::Error`
//! - `defmt` - hardware builds: `defmt` logs and `defmt::Format` derives
//!   (use with `default-features = false`)
//!
//! # Example
//!
//! ```
//! use badge_firmware::display::{DisplayManager, ImageKind};
//! use platform::mocks::{MemoryStorage, MockPanel};
//!
//! let panel = MockPanel::new(240, 416);
//! let mut display = DisplayManager::new(panel, MemoryStorage::new()).unwrap();
//! display.clear_display_buffers();
//! display.write_centered_message("Hello", 40, 1, false).unwrap();
//! display.render_full_display(ImageKind::Monochrome).unwrap();
//! assert_eq!(display.panel().refresh_count(), 1);
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

extern crate alloc;

pub mod display;

// Re-export key types
pub use display::{
    DisplayError, DisplayManager, Gdew0371w7, PlaneStore, DISPLAY_HEIGHT, DISPLAY_WIDTH,
    GDEW0371W7_SPEC, PLANE_BYTES, ROW_STRIDE,
};
