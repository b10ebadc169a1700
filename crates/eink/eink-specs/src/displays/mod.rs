//! Pre-configured panel specifications

pub mod gooddisplay;

pub use gooddisplay::*;
