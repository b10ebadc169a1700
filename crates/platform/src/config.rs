//! Application configuration and constants
//!
//! Fixed screen layout values. Screens reference these
//! constants rather than hardcoding values.

/// Second line of the fatal error screen.
pub const RESET_PROMPT: &str = "Please reset the device";

/// Top row of the error message on the fatal error screen.
pub const ERROR_MESSAGE_Y: u16 = 180;

/// Top row of [`RESET_PROMPT`] on the fatal error screen.
pub const RESET_PROMPT_Y: u16 = 215;

/// Font index used by the fatal error screen (bold).
pub const ERROR_FONT: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_screen_layout_is_ordered() {
        assert!(ERROR_MESSAGE_Y < RESET_PROMPT_Y);
        assert!(RESET_PROMPT_Y < 416);
        assert!(ERROR_FONT <= 2);
        assert!(RESET_PROMPT.is_ascii());
    }
}
