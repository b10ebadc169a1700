//! Waveform lookup tables for the UC8171 controller
//!
//! Every table register takes 42 bytes: seven 6-byte phases of
//! `[level select, frames A, frames B, frames C, frames D, repeat]`.
//! Unused phases are zero.

use platform::Waveform;

use super::driver::Command;

/// Bytes per LUT register.
pub const LUT_LEN: usize = 42;

/// One LUT register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutTable {
    /// Register command (0x20..=0x25)
    pub command: Command,
    /// Register contents
    pub data: &'static [u8; LUT_LEN],
}

/// Single-phase bi-level table: `[first, 35, 0, 35, 0, 1]` then zeros.
#[allow(clippy::indexing_slicing)]
const fn partial(first: u8) -> [u8; LUT_LEN] {
    let mut table = [0u8; LUT_LEN];
    table[0] = first;
    table[1] = 0x23;
    table[3] = 0x23;
    table[5] = 0x01;
    table
}

/// Pad a 24-byte, four-phase table to the register length.
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
const fn four_phase(phases: [u8; 24]) -> [u8; LUT_LEN] {
    let mut table = [0u8; LUT_LEN];
    let mut i = 0;
    while i < phases.len() {
        table[i] = phases[i];
        i += 1;
    }
    table
}

static PARTIAL_VCOM: [u8; LUT_LEN] = partial(0x00);
static PARTIAL_WW: [u8; LUT_LEN] = partial(0x00);
static PARTIAL_BW: [u8; LUT_LEN] = partial(0x48);
static PARTIAL_WB: [u8; LUT_LEN] = partial(0x84);
static PARTIAL_BB: [u8; LUT_LEN] = partial(0x00);
static PARTIAL_BORDER: [u8; LUT_LEN] = partial(0x00);

#[rustfmt::skip]
static GRAY_VCOM: [u8; LUT_LEN] = four_phase([
    0x00, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x60, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x13, 0x0A, 0x01, 0x00, 0x01,
]);

#[rustfmt::skip]
static GRAY_WW: [u8; LUT_LEN] = four_phase([
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x10, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0xA0, 0x13, 0x01, 0x00, 0x00, 0x01,
]);

#[rustfmt::skip]
static GRAY_BW: [u8; LUT_LEN] = four_phase([
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x99, 0x0C, 0x01, 0x03, 0x04, 0x01,
]);

#[rustfmt::skip]
static GRAY_WB: [u8; LUT_LEN] = four_phase([
    0x40, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x00, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x99, 0x0B, 0x04, 0x04, 0x01, 0x01,
]);

#[rustfmt::skip]
static GRAY_BB: [u8; LUT_LEN] = four_phase([
    0x80, 0x0A, 0x00, 0x00, 0x00, 0x01,
    0x90, 0x14, 0x14, 0x00, 0x00, 0x01,
    0x20, 0x14, 0x0A, 0x00, 0x00, 0x01,
    0x50, 0x13, 0x01, 0x00, 0x00, 0x01,
]);

/// Bi-level tables for monochrome partial updates.
pub static PARTIAL: [LutTable; 6] = [
    LutTable { command: Command::LutVcom, data: &PARTIAL_VCOM },
    LutTable { command: Command::LutWw, data: &PARTIAL_WW },
    LutTable { command: Command::LutBw, data: &PARTIAL_BW },
    LutTable { command: Command::LutWb, data: &PARTIAL_WB },
    LutTable { command: Command::LutBb, data: &PARTIAL_BB },
    LutTable { command: Command::LutBorder, data: &PARTIAL_BORDER },
];

/// Four-level tables for the two-plane grayscale refresh. The border keeps
/// the partial table.
pub static GRAYSCALE: [LutTable; 6] = [
    LutTable { command: Command::LutVcom, data: &GRAY_VCOM },
    LutTable { command: Command::LutWw, data: &GRAY_WW },
    LutTable { command: Command::LutBw, data: &GRAY_BW },
    LutTable { command: Command::LutWb, data: &GRAY_WB },
    LutTable { command: Command::LutBb, data: &GRAY_BB },
    LutTable { command: Command::LutBorder, data: &PARTIAL_BORDER },
];

/// Register writes for `waveform`, in programming order.
pub fn tables(waveform: Waveform) -> &'static [LutTable; 6] {
    match waveform {
        Waveform::Partial => &PARTIAL,
        Waveform::Grayscale => &GRAYSCALE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tables_are_single_phase() {
        let firsts: Vec<u8> = PARTIAL.iter().map(|t| t.data[0]).collect();
        assert_eq!(firsts, [0x00, 0x00, 0x48, 0x84, 0x00, 0x00]);
        for t in &PARTIAL {
            assert_eq!(&t.data[1..6], &[35, 0, 35, 0, 1]);
            assert!(t.data[6..].iter().all(|b| *b == 0));
        }
    }

    #[test]
    fn test_registers_in_order() {
        for waveform in [Waveform::Partial, Waveform::Grayscale] {
            let commands: Vec<u8> = tables(waveform).iter().map(|t| t.command as u8).collect();
            assert_eq!(commands, [0x20, 0x21, 0x22, 0x23, 0x24, 0x25]);
        }
    }

    #[test]
    fn test_grayscale_tables_pad_after_four_phases() {
        assert_eq!(&GRAYSCALE[2].data[18..24], &[0x99, 0x0C, 0x01, 0x03, 0x04, 0x01]);
        assert_eq!(&GRAYSCALE[3].data[18..24], &[0x99, 0x0B, 0x04, 0x04, 0x01, 0x01]);
        for t in &GRAYSCALE {
            assert!(t.data[24..].iter().all(|b| *b == 0));
        }
        assert_eq!(GRAYSCALE[5].data, PARTIAL[5].data);
    }
}
