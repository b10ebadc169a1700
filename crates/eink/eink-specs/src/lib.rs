//! E-Paper Panel Specifications
//!
//! Static descriptions of e-paper panels: geometry, packed plane size,
//! refresh timing and the temperature window the waveforms are tuned for.
//!
//! # Features
//!
//! - **no_std compatible** - usable from firmware crates
//! - **Temperature compensation** - stretch refresh budgets in the cold
//!
//! # Example
//!
//! ```
//! use eink_specs::displays::GDEW0371W7;
//!
//! let spec = GDEW0371W7;
//! assert_eq!((spec.width, spec.height), (240, 416));
//! assert_eq!(spec.plane_bytes(), 12_480);
//!
//! // A cold badge needs a longer busy budget
//! let cold = spec.adjusted_refresh_ms(spec.full_refresh_ms, -5);
//! assert!(cold > spec.full_refresh_ms);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod display_spec;
pub mod displays;

pub use display_spec::DisplaySpec;
