//! Property-based tests for the compositor and the partial window.
//! Verifies invariants hold for ALL valid placements, not just fixed examples.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use badge_firmware::display::{composite, CompositeMode, PartialWindow, RenderedImage};
use badge_firmware::{DisplayError, PlaneStore};
use platform::{PlaneKind, Region};
use proptest::prelude::*;

/// Image of `w_bytes × 8` by `h` pixels filled with `seed`-derived bytes.
fn image(w_bytes: u16, h: u16, seed: u8) -> RenderedImage {
    let len = usize::from(w_bytes) * usize::from(h);
    let data = (0..len).map(|i| seed.wrapping_mul(31).wrapping_add(i as u8)).collect();
    RenderedImage::monochrome(w_bytes * 8, h, data).unwrap()
}

proptest! {
    /// Compositing the same image twice in opaque mode equals compositing it once.
    #[test]
    fn opaque_is_idempotent(
        x_byte in 0u16..30,
        y in 0u16..416,
        w_seed: u16,
        h_seed: u16,
        seed: u8,
    ) {
        let w_bytes = 1 + w_seed % (30 - x_byte);
        let h = 1 + h_seed % (416 - y).min(64);
        let img = image(w_bytes, h, seed);

        let mut once = PlaneStore::new();
        composite(&mut once, &img, x_byte * 8, y, CompositeMode::Opaque).unwrap();
        let mut twice = PlaneStore::new();
        composite(&mut twice, &img, x_byte * 8, y, CompositeMode::Opaque).unwrap();
        composite(&mut twice, &img, x_byte * 8, y, CompositeMode::Opaque).unwrap();

        prop_assert_eq!(once.plane(PlaneKind::New), twice.plane(PlaneKind::New));
        prop_assert_eq!(once.plane(PlaneKind::Old), twice.plane(PlaneKind::Old));
    }

    /// Transparent compositing never turns an inked pixel back to background.
    #[test]
    fn transparent_is_monotonic(
        w_bytes in 1u16..=8,
        h in 1u16..=32,
        x in 0u16..240,
        y in 0u16..416,
        first: u8,
        second: u8,
    ) {
        prop_assume!((x & !7) + w_bytes * 8 <= 240 && y + h <= 416);
        let mut planes = PlaneStore::new();
        composite(&mut planes, &image(w_bytes, h, first), x, y, CompositeMode::Transparent).unwrap();
        let before = planes.plane(PlaneKind::New).to_vec();
        composite(&mut planes, &image(w_bytes, h, second), x, y, CompositeMode::Transparent).unwrap();

        for (b, a) in before.iter().zip(planes.plane(PlaneKind::New)) {
            // Every ink bit (0) before is still ink after.
            prop_assert_eq!(a & !b, 0);
        }
    }

    /// Placements that do not fit fail without touching either plane.
    #[test]
    fn out_of_bounds_leaves_planes_untouched(
        w_bytes in 1u16..=30,
        h in 1u16..=64,
        x in 0u16..240,
        y in 0u16..416,
    ) {
        prop_assume!((x & !7) + w_bytes * 8 > 240 || y + h > 416);
        let mut planes = PlaneStore::new();
        let result = composite(&mut planes, &image(w_bytes, h, 0), x, y, CompositeMode::Opaque);
        prop_assert_eq!(result, Err(DisplayError::OutOfBounds));
        prop_assert!(planes.plane(PlaneKind::Old).iter().all(|b| *b == 0xFF));
        prop_assert!(planes.plane(PlaneKind::New).iter().all(|b| *b == 0xFF));
    }

    /// decode(encode(window)) is the identity for byte-aligned regions.
    #[test]
    fn partial_window_is_self_inverse(
        x_byte in 0u16..30,
        w_seed: u16,
        y in 0u16..416,
        h_seed: u16,
    ) {
        let w_bytes = 1 + w_seed % (30 - x_byte);
        let h = 1 + h_seed % (416 - y);
        let region = Region::new(x_byte * 8, y, w_bytes * 8, h);
        let window = PartialWindow::for_region(region).unwrap();
        let decoded = PartialWindow::decode(&window.encode());
        prop_assert_eq!(decoded, window);
        prop_assert_eq!(decoded.to_region(), region);
    }
}
