//! E-paper panel bus wiring and protocol timing.
//!
//! # Wiring (ESP32 badge board)
//!
//! | Signal | GPIO | Direction |
//! |--------|------|-----------|
//! | SCK/MOSI | VSPI | Host → Panel |
//! | CS     | 27 (managed by `SpiDevice`) | Host → Panel |
//! | RST    | 25   | Host → Panel |
//! | DC     | 32   | Host → Panel |
//! | BUSY   | 26   | Panel → Host (HIGH while busy) |
//!
//! The SD card shares the SPI bus; `SpiDevice` arbitration replaces the
//! manual bus switching the board needs without it.

/// Timing parameters for the panel refresh protocol.
///
/// All values are in milliseconds except [`max_busy_polls`](Self::max_busy_polls).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelTiming {
    /// How long RST is held low, then high, during the reset pulse.
    pub reset_pulse_ms: u32,
    /// Delay between the refresh command and the first busy poll.
    pub refresh_settle_ms: u32,
    /// Delay between two busy polls.
    pub busy_poll_interval_ms: u32,
    /// Busy polls before the wait is abandoned with a timeout.
    pub max_busy_polls: u32,
}

impl PanelTiming {
    /// GDEW0371W7 reference timing: 10 ms reset phases, 10 ms settle,
    /// 1 ms polls with a 6 s budget (twice the nominal full refresh).
    pub const fn gdew0371w7() -> Self {
        Self {
            reset_pulse_ms: 10,
            refresh_settle_ms: 10,
            busy_poll_interval_ms: 1,
            max_busy_polls: 6_000,
        }
    }

    /// Same timing with the busy budget resized to cover `budget_ms`.
    ///
    /// The poll count never drops below one so a responsive panel is
    /// always checked at least once.
    pub const fn for_refresh_budget(self, budget_ms: u32) -> Self {
        let interval = if self.busy_poll_interval_ms == 0 {
            1
        } else {
            self.busy_poll_interval_ms
        };
        let polls = budget_ms / interval;
        Self {
            max_busy_polls: if polls == 0 { 1 } else { polls },
            ..self
        }
    }

    /// Total time the busy wait may block, in milliseconds.
    pub const fn busy_budget_ms(&self) -> u32 {
        self.max_busy_polls.saturating_mul(self.busy_poll_interval_ms)
    }
}

impl Default for PanelTiming {
    fn default() -> Self {
        Self::gdew0371w7()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_timing() {
        let t = PanelTiming::default();
        assert_eq!(t.reset_pulse_ms, 10);
        assert_eq!(t.refresh_settle_ms, 10);
        assert_eq!(t.busy_budget_ms(), 6_000);
    }

    #[test]
    fn test_budget_resizes_poll_count() {
        let t = PanelTiming {
            busy_poll_interval_ms: 10,
            ..PanelTiming::default()
        }
        .for_refresh_budget(4_500);
        assert_eq!(t.max_busy_polls, 450);
        assert_eq!(t.busy_budget_ms(), 4_500);
    }

    #[test]
    fn test_budget_never_zero_polls() {
        let t = PanelTiming::default().for_refresh_budget(0);
        assert_eq!(t.max_busy_polls, 1);

        let zero_interval = PanelTiming {
            busy_poll_interval_ms: 0,
            ..PanelTiming::default()
        }
        .for_refresh_budget(50);
        assert_eq!(zero_interval.max_busy_polls, 50);
    }
}
