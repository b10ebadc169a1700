//! Display specification types

/// Static specification of an e-paper panel
///
/// Captures what the firmware needs to size its planes and budget its
/// refresh waits:
/// - Physical resolution
/// - Full refresh timing
/// - Operating temperature window
#[derive(Debug, Clone)]
pub struct DisplaySpec {
    /// Display name (e.g., "GDEW0371W7")
    pub name: &'static str,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Full refresh duration in milliseconds
    pub full_refresh_ms: u32,

    /// Operating temperature range minimum (°C)
    pub temp_operating_min: i8,

    /// Operating temperature range maximum (°C)
    pub temp_operating_max: i8,
}

impl DisplaySpec {
    /// Bytes in one packed 1bpp plane (`width * height / 8`, rounded up).
    pub const fn plane_bytes(&self) -> usize {
        // width/height are panel resolutions (< 2^16); the product fits usize.
        #[allow(clippy::arithmetic_side_effects)]
        let bits = self.width as usize * self.height as usize;
        bits.div_ceil(8)
    }

    /// Bytes per plane row (`width / 8`, rounded up).
    pub const fn row_stride_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Adjust refresh timing for ambient temperature
    ///
    /// E-paper particles slow down away from room temperature:
    /// - Below 0°C: steep slowdown
    /// - 0-5°C: transition zone
    /// - 5-35°C: nominal (1.0x)
    /// - 35-45°C: gradual slowdown
    /// - Above 45°C: significant slowdown
    pub fn adjusted_refresh_ms(&self, base_ms: u32, temp: i8) -> u32 {
        let t = f32::from(temp);
        let factor = match temp {
            i8::MIN..=-1 => 1.5 - t * 0.05,
            0..=4 => 1.5 - (t / 5.0) * 0.3,
            5..=35 => 1.0,
            36..=45 => 1.0 + ((t - 35.0) / 10.0) * 0.2,
            _ => 1.2 + (t - 45.0) * 0.03,
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let adjusted = (base_ms as f32 * factor) as u32;
        adjusted
    }

    /// Check if temperature is in operating range
    pub fn is_operating_temp(&self, temp_celsius: i8) -> bool {
        temp_celsius >= self.temp_operating_min && temp_celsius <= self.temp_operating_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec() -> DisplaySpec {
        DisplaySpec {
            name: "Test Display",
            width: 250,
            height: 122,
            full_refresh_ms: 2000,
            temp_operating_min: 0,
            temp_operating_max: 50,
        }
    }

    #[test]
    fn test_plane_geometry_rounds_up() {
        let spec = test_spec();
        // 250 px rows need 32 bytes, the last one partially used.
        assert_eq!(spec.row_stride_bytes(), 32);
        assert_eq!(spec.plane_bytes(), (250 * 122usize).div_ceil(8));
    }

    #[test]
    fn test_temperature_adjustment() {
        let spec = test_spec();

        assert_eq!(spec.adjusted_refresh_ms(2000, 25), 2000);
        // -5°C: 1.5 + 5 * 0.05 = 1.75
        assert_eq!(spec.adjusted_refresh_ms(2000, -5), 3500);
        // 45°C: 1.0 + 1.0 * 0.2 = 1.2
        assert_eq!(spec.adjusted_refresh_ms(2000, 45), 2400);
        // 0°C sits on the cold boundary
        assert_eq!(spec.adjusted_refresh_ms(2000, 0), 3000);
    }

    #[test]
    fn test_temperature_extremes_keep_growing() {
        let spec = test_spec();
        assert!(spec.adjusted_refresh_ms(2000, -20) > spec.adjusted_refresh_ms(2000, -10));
        assert!(spec.adjusted_refresh_ms(2000, 60) > spec.adjusted_refresh_ms(2000, 50));
    }

    #[test]
    fn test_operating_range_is_inclusive() {
        let spec = test_spec();
        assert!(spec.is_operating_temp(0));
        assert!(spec.is_operating_temp(50));
        assert!(!spec.is_operating_temp(-1));
        assert!(!spec.is_operating_temp(51));
    }
}
