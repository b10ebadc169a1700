//! Hardware Abstraction Layer (HAL) for the badge firmware
//!
//! This crate provides the trait seams between the display engine and the
//! hardware it drives, so the engine can be developed and tested without a
//! physical panel or SD card.
//!
//! # Architecture Layers
//!
//! ```text
//! Badge screens (menu / state machine)
//!         ↓
//! Display engine (badge-firmware crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! embedded-hal bus + pins (SPI, DC, RST, BUSY)
//! ```
//!
//! # Abstractions
//!
//! - [`PanelDriver`] - e-paper refresh protocol (power, LUTs, windows, transfers)
//! - [`Storage`] - file access for bitmap assets
//! - [`display_config`] - panel bus wiring and protocol timing
//! - [`config`] - application constants and fixed screen layout
//!
//! # Features
//!
//! - `std`: host support (file-backed storage, mocks, `std::error::Error`)
//! - `defmt`: `defmt::Format` derives for hardware logging
//!
//! # Example
//!
//! ```no_run
//! use platform::{PanelDriver, PlaneKind, Region, Waveform};
//!
//! fn blank<P: PanelDriver>(panel: &mut P) -> Result<(), P::DriverError> {
//!     let info = panel.info();
//!     panel.power_on()?;
//!     panel.load_waveform(Waveform::Partial)?;
//!     panel.fill_region(PlaneKind::New, Region::full(info.width, info.height), 0xFF)?;
//!     panel.refresh()?;
//!     panel.sleep()
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod display;
pub mod display_config;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod storage_local;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use display::{DisplayInfo, PanelDriver, PanelError, PlaneKind, Region, Waveform};
pub use display_config::PanelTiming;
pub use storage::Storage;
