//! Good Display e-paper panel specifications

use crate::DisplaySpec;

/// Good Display GDEW0371W7 (240×416, UC8171)
///
/// 3.7" badge panel. The controller RAM is bi-level but two sequential
/// transfers with custom LUTs reach four gray levels.
/// - Full refresh: ~3s
/// - Gate scan starts at the bottom row of the image
pub const GDEW0371W7: DisplaySpec = DisplaySpec {
    name: "GDEW0371W7",
    width: 240,
    height: 416,
    full_refresh_ms: 3000,
    temp_operating_min: 0,
    temp_operating_max: 50,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdew0371w7_geometry() {
        assert_eq!(GDEW0371W7.width, 240);
        assert_eq!(GDEW0371W7.height, 416);
        assert_eq!(GDEW0371W7.row_stride_bytes(), 30);
        assert_eq!(GDEW0371W7.plane_bytes(), 12_480);
    }

    #[test]
    fn test_gdew0371w7_operating_window() {
        assert!(GDEW0371W7.is_operating_temp(20));
        assert!(!GDEW0371W7.is_operating_temp(-10));
    }
}
